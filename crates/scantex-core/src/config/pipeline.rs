//! Pipeline behavior settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings governing job execution and scratch-space handling.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Root directory for per-job scratch directories.
    #[serde(default)]
    pub temp_root: Option<PathBuf>,

    /// Keep intermediate artifacts instead of deleting them. Debugging
    /// aid; leaves the scratch directory and stage outputs in place.
    #[serde(default)]
    pub keep_intermediates: bool,

    /// Minimum size in bytes for a stage output to count as produced.
    #[serde(default = "default_min_output_bytes")]
    #[validate(range(min = 1))]
    pub min_output_bytes: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            temp_root: None,
            keep_intermediates: false,
            min_output_bytes: default_min_output_bytes(),
        }
    }
}

fn default_min_output_bytes() -> u64 {
    1
}

impl PipelineSettings {
    /// Resolve the effective scratch root directory.
    pub fn effective_temp_root(&self) -> PathBuf {
        self.temp_root
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("scantex"))
    }
}
