//! External tool locations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Overrides for external tool locations.
///
/// Unset fields fall back to the per-OS defaults picked during profile
/// resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Surface-repair tool executable.
    pub repair_tool: Option<PathBuf>,
    /// Mesh-processing server executable.
    pub mesh_server: Option<PathBuf>,
    /// UV-unwrap tool executable.
    pub uv_tool: Option<PathBuf>,
    /// Archiver executable used by the grouping utility.
    pub archive_tool: Option<PathBuf>,
    /// Directory holding the macro and filter scripts the tools consume.
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            repair_tool: None,
            mesh_server: None,
            uv_tool: None,
            archive_tool: None,
            scripts_dir: default_scripts_dir(),
        }
    }
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from("scripts")
}
