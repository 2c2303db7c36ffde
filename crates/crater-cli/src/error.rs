//! Error type for the crater-forge binary.

use std::path::PathBuf;

use crater_config::ConfigError;
use crater_core::CraterError;

/// Everything that can stop a command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Loading or saving `config.ron` failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Crater generation rejected its input.
    #[error("generation failed: {0}")]
    Generation(#[from] CraterError),

    /// A file could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Preset names are restricted to letters, digits, `-` and `_`.
    #[error("invalid preset name {0:?}")]
    InvalidPresetName(String),

    /// No preset with this name exists.
    #[error("preset {0:?} not found")]
    PresetNotFound(String),

    /// A preset file is not valid RON.
    #[error("failed to parse preset {}: {source}", path.display())]
    PresetParse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// Parameters could not be serialized.
    #[error("failed to serialize preset: {0}")]
    PresetSerialize(#[source] ron::Error),
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
