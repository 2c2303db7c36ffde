//! Command-line overrides shared by every crater-forge command.

use std::path::PathBuf;

use clap::Args;

use crate::Config;

/// Global command-line overrides.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Args, Debug, Default, Clone)]
pub struct CliArgs {
    /// Number of profile rings.
    #[arg(long, global = true)]
    pub rings: Option<u32>,

    /// Number of angular segments.
    #[arg(long, global = true)]
    pub segments: Option<u32>,

    /// Random seed.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// UV island margin in `[0, 1/3)`.
    #[arg(long, global = true)]
    pub uv_margin: Option<f64>,

    /// Output directory for exported meshes.
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(rings) = args.rings {
            self.crater.ring_count = rings;
        }
        if let Some(segments) = args.segments {
            self.crater.segment_count = segments;
        }
        if let Some(seed) = args.seed {
            self.crater.seed = seed;
        }
        if let Some(margin) = args.uv_margin {
            self.generator.uv_margin = margin;
        }
        if let Some(ref dir) = args.output_dir {
            self.output.directory = dir.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
