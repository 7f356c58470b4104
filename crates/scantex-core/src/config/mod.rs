//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML via the
//! `config` crate, with `SCANTEX`-prefixed environment variables
//! layered on top. Each sub-module represents a logical configuration
//! section; every field has a default, so running without any
//! configuration file is supported.

pub mod logging;
pub mod pipeline;
pub mod tools;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

pub use self::logging::LoggingConfig;
pub use self::pipeline::PipelineSettings;
pub use self::tools::ToolsConfig;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration sources could not be read or merged
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    /// The host operating system has no tool profile
    #[error("Unsupported platform '{os}'")]
    UnsupportedPlatform {
        /// The `std::env::consts::OS` value that failed to resolve
        os: String,
    },

    /// A configured path could not be made absolute
    #[error("Failed to resolve path '{path}': {source}")]
    ResolvePath {
        /// The path that failed to resolve
        path: PathBuf,
        /// The underlying OS error
        #[source]
        source: std::io::Error,
    },
}

/// Root application configuration.
///
/// Top-level deserialization target for the merged configuration file
/// and environment overlay.
#[derive(Debug, Clone, Default, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// External tool locations and overrides.
    pub tools: ToolsConfig,
    /// Pipeline behavior settings.
    #[validate(nested)]
    pub pipeline: PipelineSettings,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file plus environment variables
    /// prefixed with `SCANTEX` (e.g. `SCANTEX__PIPELINE__TEMP_ROOT`).
    ///
    /// The file is optional; defaults cover every field.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("SCANTEX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }
}
