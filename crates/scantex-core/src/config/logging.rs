//! Logging settings.

use serde::{Deserialize, Serialize};

/// Console logging settings.
///
/// `RUST_LOG`, when set, takes precedence over the configured level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter: `"trace"`, `"debug"`, `"info"`, `"warn"` or `"error"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format: `"pretty"` for interactive runs, `"json"` for log
    /// collectors.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}
