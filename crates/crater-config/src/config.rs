//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use crater_core::{CraterParameters, GeneratorSettings, ZoneMaterials};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted configuration.
pub const CONFIG_FILE_NAME: &str = "config.ron";
/// Directory name under the platform config directory.
pub const APP_DIR_NAME: &str = "crater-forge";

/// Platform config directory for this tool (e.g. `~/.config/crater-forge`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|base| base.join(APP_DIR_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// Top-level host configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Generator tuning (UV margin, merge tolerance, thresholds, threading).
    pub generator: GeneratorSettings,
    /// Crater shape used when no preset is given.
    pub crater: CraterParameters,
    /// Materials written for the inner and outer zones.
    pub materials: ZoneMaterials,
    /// Output settings.
    pub output: OutputConfig,
    /// Batch generation settings.
    pub batch: BatchConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Where and how meshes are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives exported meshes.
    pub directory: PathBuf,
    /// Object name written into exported files.
    pub object_name: String,
    /// Write a companion `.mtl` file with the zone materials.
    pub write_materials: bool,
    /// Preset directory. `None` uses `presets/` inside the config directory.
    pub presets_dir: Option<PathBuf>,
}

/// Batch generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of craters per batch when not given on the command line.
    pub count: usize,
    /// Craters per row in a combined batch export.
    pub columns: usize,
    /// Gap between neighbouring craters, as a multiple of the largest outer radius.
    pub spacing: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level filter (e.g., "debug", "info", "warn,crater_core=debug").
    pub log_level: String,
    /// Also write a JSON log file into the config directory.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            object_name: "Crater".to_string(),
            write_materials: true,
            presets_dir: None,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count: 8,
            columns: 4,
            spacing: 0.5,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE_NAME))?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Check generator settings, default crater parameters, and materials.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator
            .validate()
            .map_err(ConfigError::InvalidSettings)?;
        self.crater.validate().map_err(ConfigError::InvalidSettings)?;
        self.materials
            .clone()
            .validated()
            .map_err(ConfigError::InvalidMaterial)?;
        Ok(())
    }

    /// Preset directory, resolved against `config_dir` when not set explicitly.
    pub fn presets_dir(&self, config_dir: &Path) -> PathBuf {
        self.output
            .presets_dir
            .clone()
            .unwrap_or_else(|| config_dir.join("presets"))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}
