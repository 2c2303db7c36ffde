//! Configuration for the crater generator host.
//!
//! Settings persist to disk as `config.ron` and can be overridden from the
//! command line via clap. Unknown fields are ignored and missing fields fall
//! back to defaults, so config files survive upgrades in both directions.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    APP_DIR_NAME, BatchConfig, CONFIG_FILE_NAME, Config, DebugConfig, OutputConfig,
    default_config_dir,
};
pub use error::ConfigError;
