//! crater-forge: generate procedural impact crater meshes from the command line.

mod error;
mod export;
mod presets;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use crater_config::{CliArgs, Config, default_config_dir};
use crater_core::{
    CraterGenerator, CraterParameters, GeneratedCrater, RandomRanges, predict_counts,
};
use glam::Vec3;
use tracing::{debug, info, warn};

use crate::error::CliError;
use crate::export::{ObjObject, write_files};
use crate::presets::PresetStore;

#[derive(Parser, Debug)]
#[command(name = "crater-forge", version, about = "Procedural impact crater mesh generator")]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one crater from the configured parameters or a preset.
    Generate {
        /// Preset to generate instead of the configured crater.
        #[arg(long)]
        preset: Option<String>,
        /// Output file stem (defaults to the configured object name).
        #[arg(long)]
        name: Option<String>,
    },
    /// Generate one crater with randomized parameters.
    Random {
        /// Save the resolved parameters as a preset.
        #[arg(long)]
        save_preset: Option<String>,
    },
    /// Generate a batch of randomized craters.
    Batch {
        /// Number of craters (defaults to the configured batch count).
        #[arg(long)]
        count: Option<usize>,
        /// Write one file per crater instead of a single laid-out file.
        #[arg(long)]
        separate: bool,
    },
    /// Manage parameter presets.
    Preset {
        #[command(subcommand)]
        action: PresetCommand,
    },
    /// Restore the default configuration file.
    Reset,
}

#[derive(Subcommand, Debug)]
enum PresetCommand {
    /// Save the configured crater (after overrides) as a preset.
    Save { name: String },
    /// List saved presets.
    List,
    /// Print a preset as RON.
    Show { name: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Resolve config directory
    let config_dir = match cli.args.config.clone() {
        Some(dir) => dir,
        None => default_config_dir().unwrap_or_else(|e| {
            eprintln!("{e}, using the current directory");
            PathBuf::from(".")
        }),
    };

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&cli.args);

    crater_log::init_logging(
        Some(&config_dir.join("logs")),
        cfg!(debug_assertions),
        Some(&config),
    );

    match run(&cli, &config, &config_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &Config, config_dir: &Path) -> Result<(), CliError> {
    let presets = PresetStore::new(config.presets_dir(config_dir));

    match &cli.command {
        Command::Generate { preset, name } => {
            let params = match preset {
                Some(preset) => {
                    let mut params = presets.load(preset)?;
                    apply_shape_overrides(&mut params, &cli.args);
                    params
                }
                None => config.crater.clone(),
            };
            let stem = name.as_deref().unwrap_or(&config.output.object_name);
            generate_one(config, &params, stem)?;
        }
        Command::Random { save_preset } => {
            let mut params = config.crater.clone();
            if params.ranges.is_empty() {
                params.ranges = RandomRanges::classic();
            }
            if cli.args.seed.is_none() {
                params.seed = rand::random();
            }
            let stem = format!("{}_random", config.output.object_name);
            let crater = generate_one(config, &params, &stem)?;
            let p = &crater.params;
            info!(
                seed = p.seed,
                "random crater: outer={:.2} inner={:.2} depth={:.2} rim={:.2} segments={}",
                p.outer_radius,
                p.inner_radius,
                p.depth,
                p.rim_height,
                p.segment_count
            );
            if let Some(name) = save_preset {
                let path = presets.save(name, &crater.params)?;
                info!("saved resolved parameters to {}", path.display());
            }
        }
        Command::Batch { count, separate } => {
            let count = count.unwrap_or(config.batch.count);
            let mut base = config.crater.clone();
            if base.ranges.is_empty() {
                base.ranges = RandomRanges::classic();
            }
            generate_batch(config, &base, count, *separate)?;
        }
        Command::Preset { action } => match action {
            PresetCommand::Save { name } => {
                let path = presets.save(name, &config.crater)?;
                info!("saved preset {name:?} to {}", path.display());
            }
            PresetCommand::List => {
                let names = presets.list()?;
                if names.is_empty() {
                    println!("no presets in {}", presets.dir().display());
                }
                for name in names {
                    println!("{name}");
                }
            }
            PresetCommand::Show { name } => {
                let params = presets.load(name)?;
                let pretty = ron::ser::PrettyConfig::new().depth_limit(3);
                let text =
                    ron::ser::to_string_pretty(&params, pretty).map_err(CliError::PresetSerialize)?;
                println!("{text}");
            }
        },
        Command::Reset => {
            Config::default().save(config_dir)?;
            info!("restored default config in {}", config_dir.display());
        }
    }
    Ok(())
}

/// Command-line shape flags win over the values stored in a preset.
fn apply_shape_overrides(params: &mut CraterParameters, args: &CliArgs) {
    if let Some(rings) = args.rings {
        params.ring_count = rings;
    }
    if let Some(segments) = args.segments {
        params.segment_count = segments;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
}

fn generate_one(
    config: &Config,
    params: &CraterParameters,
    stem: &str,
) -> Result<GeneratedCrater, CliError> {
    let generator = CraterGenerator::new(config.generator.clone());
    if params.ranges.is_empty() {
        let (vertices, triangles) = predict_counts(params);
        debug!(vertices, triangles, "predicted size");
    }

    let crater = generator.generate(params)?;
    log_report(stem, &crater);

    let objects = [ObjObject {
        name: stem.to_string(),
        mesh: &crater.mesh,
        offset: Vec3::ZERO,
    }];
    let materials = config.output.write_materials.then_some(&config.materials);
    let files = write_files(&config.output.directory, stem, &objects, materials)?;
    info!("wrote {}", files.obj.display());
    if let Some(mtl) = &files.mtl {
        debug!("wrote {}", mtl.display());
    }
    Ok(crater)
}

fn generate_batch(
    config: &Config,
    base: &CraterParameters,
    count: usize,
    separate: bool,
) -> Result<(), CliError> {
    if count == 0 {
        warn!("batch count is zero, nothing to generate");
        return Ok(());
    }

    let generator = CraterGenerator::new(config.generator.clone());
    let craters = generator.generate_batch(base, count)?;
    let names: Vec<String> = (0..craters.len())
        .map(|i| format!("{}_{i:03}", config.output.object_name))
        .collect();
    for (name, crater) in names.iter().zip(&craters) {
        log_report(name, crater);
    }

    let materials = config.output.write_materials.then_some(&config.materials);
    if separate {
        for (name, crater) in names.iter().zip(&craters) {
            let objects = [ObjObject {
                name: name.clone(),
                mesh: &crater.mesh,
                offset: Vec3::ZERO,
            }];
            write_files(&config.output.directory, name, &objects, materials)?;
        }
        info!("wrote {} craters to {}", craters.len(), config.output.directory.display());
        return Ok(());
    }

    let offsets = grid_offsets(&craters, config.batch.columns, config.batch.spacing);
    let objects: Vec<ObjObject<'_>> = names
        .iter()
        .zip(&craters)
        .zip(offsets)
        .map(|((name, crater), offset)| ObjObject {
            name: name.clone(),
            mesh: &crater.mesh,
            offset,
        })
        .collect();
    let stem = format!("{}_batch", config.output.object_name);
    let files = write_files(&config.output.directory, &stem, &objects, materials)?;
    info!("wrote {} craters to {}", craters.len(), files.obj.display());
    Ok(())
}

/// Lay craters out row by row on the XY plane. Cells are sized by the widest
/// crater so neighbours never overlap.
fn grid_offsets(craters: &[GeneratedCrater], columns: usize, spacing: f64) -> Vec<Vec3> {
    let columns = columns.max(1);
    let widest = craters
        .iter()
        .map(|c| c.params.outer_radius)
        .fold(0.0, f64::max);
    let cell = (2.0 * widest * (1.0 + spacing.max(0.0))) as f32;

    (0..craters.len())
        .map(|i| Vec3::new((i % columns) as f32 * cell, (i / columns) as f32 * cell, 0.0))
        .collect()
}

fn log_report(name: &str, crater: &GeneratedCrater) {
    let report = &crater.report;
    info!(
        vertices = report.vertex_count,
        triangles = report.triangle_count,
        gpu_bytes = report.gpu_bytes,
        bucket = %report.bucket,
        "{name}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["crater-forge", "--segments", "32", "batch", "--count", "3"])
            .unwrap();
        assert_eq!(cli.args.segments, Some(32));
        assert!(matches!(
            cli.command,
            Command::Batch {
                count: Some(3),
                separate: false
            }
        ));

        let cli = Cli::try_parse_from(["crater-forge", "preset", "show", "wide", "--seed", "9"])
            .unwrap();
        assert_eq!(cli.args.seed, Some(9));
        assert!(matches!(cli.command, Command::Preset { action: PresetCommand::Show { .. } }));
    }

    #[test]
    fn test_shape_overrides_apply_to_presets() {
        let mut params = CraterParameters::default();
        let args = CliArgs {
            rings: Some(12),
            seed: Some(77),
            ..Default::default()
        };
        apply_shape_overrides(&mut params, &args);
        assert_eq!(params.ring_count, 12);
        assert_eq!(params.seed, 77);
        assert_eq!(params.segment_count, CraterParameters::default().segment_count);
    }

    #[test]
    fn test_grid_offsets_do_not_overlap() {
        let base = CraterParameters {
            ranges: RandomRanges::classic(),
            ring_count: 4,
            ..Default::default()
        };
        let craters = CraterGenerator::default().generate_batch(&base, 5).unwrap();
        let offsets = grid_offsets(&craters, 2, 0.25);
        assert_eq!(offsets.len(), 5);
        assert_eq!(offsets[0], Vec3::ZERO);
        assert_eq!(offsets[2].x, 0.0);
        assert!(offsets[2].y > 0.0);

        let widest = craters.iter().map(|c| c.params.outer_radius).fold(0.0, f64::max) as f32;
        assert!(offsets[1].x >= 2.0 * widest);
    }

    #[test]
    fn test_generate_one_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.output.directory = dir.path().to_path_buf();
        config.crater.ring_count = 4;
        config.crater.segment_count = 8;

        let crater = generate_one(&config, &config.crater, "Test").unwrap();
        assert!(crater.report.triangle_count > 0);
        assert!(dir.path().join("Test.obj").exists());
        assert!(dir.path().join("Test.mtl").exists());
    }

    #[test]
    fn test_batch_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.output.directory = dir.path().to_path_buf();
        config.output.write_materials = false;
        let base = CraterParameters {
            ranges: RandomRanges::classic(),
            ring_count: 4,
            ..Default::default()
        };

        generate_batch(&config, &base, 3, true).unwrap();
        for i in 0..3 {
            assert!(dir.path().join(format!("Crater_{i:03}.obj")).exists());
        }
        assert!(!dir.path().join("Crater_000.mtl").exists());
    }
}
