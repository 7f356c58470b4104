//! Platform profile: which external tools to run and how.
//!
//! Resolved once at startup from the host OS plus the `[tools]`
//! configuration section, then passed by reference into every
//! component. No stage consults the OS again after resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{ConfigError, ToolsConfig};
use crate::exec::check_tool_available;

/// Host operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsKind {
    Linux,
    Windows,
}

/// How the decimate-and-repair stage runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairVariant {
    /// No native repair tool: decimate via the mesh server, then pass
    /// the result through unchanged.
    ServerDecimate,
    /// Drive the native repair tool with its macro script.
    NativeMacro,
}

/// How the UV-unwrap tool is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UvLaunchVariant {
    /// Invoke directly, from any directory.
    Direct,
    /// Launch with the tool's install directory as the child's working
    /// directory; the tool locates its data files relative to it.
    InstallDir,
}

/// How the final format conversion runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvertVariant {
    /// Pass full input and output paths.
    Direct,
    /// Run in the artifacts' directory with bare filenames; input and
    /// output must share a directory.
    SameDirRelative,
}

/// Resolved tool paths and per-platform behavior.
///
/// Immutable for the life of the process. The three variant tags fix
/// every platform-dependent branch up front, so the stages themselves
/// are OS-free.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolProfile {
    /// Host OS family the profile was resolved for.
    pub os: OsKind,
    /// Surface-repair tool executable.
    pub repair_tool: PathBuf,
    /// Mesh-processing server executable.
    pub mesh_tool: PathBuf,
    /// UV-unwrap tool executable.
    pub uv_tool: PathBuf,
    /// Archiver executable used by the grouping utility.
    pub archive_tool: PathBuf,
    /// Directory holding the macro and filter scripts, absolute.
    pub scripts_dir: PathBuf,
    /// Decimate-and-repair behavior.
    pub repair: RepairVariant,
    /// UV tool launch behavior.
    pub uv_launch: UvLaunchVariant,
    /// Format conversion behavior.
    pub convert: ConvertVariant,
}

impl ToolProfile {
    /// Resolve the profile for the host operating system.
    pub fn resolve(tools: &ToolsConfig) -> Result<Self, ConfigError> {
        Self::resolve_for(std::env::consts::OS, tools)
    }

    /// Resolve the profile for a named operating system
    /// (`std::env::consts::OS` values).
    ///
    /// Split out of [`resolve`](Self::resolve) so non-host variants
    /// stay testable.
    pub fn resolve_for(os: &str, tools: &ToolsConfig) -> Result<Self, ConfigError> {
        let os = match os {
            "linux" => OsKind::Linux,
            "windows" => OsKind::Windows,
            other => {
                return Err(ConfigError::UnsupportedPlatform {
                    os: other.to_string(),
                });
            }
        };

        let defaults = Defaults::for_os(os);
        let profile = Self {
            os,
            repair_tool: resolve_tool(tools.repair_tool.as_deref(), defaults.repair_tool)?,
            mesh_tool: resolve_tool(tools.mesh_server.as_deref(), defaults.mesh_tool)?,
            uv_tool: resolve_tool(tools.uv_tool.as_deref(), defaults.uv_tool)?,
            archive_tool: resolve_tool(tools.archive_tool.as_deref(), defaults.archive_tool)?,
            scripts_dir: absolutize(&tools.scripts_dir)?,
            repair: match os {
                OsKind::Linux => RepairVariant::ServerDecimate,
                OsKind::Windows => RepairVariant::NativeMacro,
            },
            uv_launch: match os {
                OsKind::Linux => UvLaunchVariant::Direct,
                OsKind::Windows => UvLaunchVariant::InstallDir,
            },
            convert: match os {
                OsKind::Linux => ConvertVariant::Direct,
                OsKind::Windows => ConvertVariant::SameDirRelative,
            },
        };

        info!(
            os = ?profile.os,
            mesh_tool = %profile.mesh_tool.display(),
            uv_tool = %profile.uv_tool.display(),
            scripts_dir = %profile.scripts_dir.display(),
            "Resolved tool profile"
        );

        Ok(profile)
    }

    /// Log a warning for every pipeline tool that cannot be found.
    ///
    /// Advisory startup report; the authoritative failure remains the
    /// launch error when a stage actually runs the tool.
    pub async fn check_pipeline_tools(&self) {
        let mut tools: Vec<&Path> = vec![&self.mesh_tool, &self.uv_tool];
        if self.repair == RepairVariant::NativeMacro {
            tools.push(&self.repair_tool);
        }

        for tool in tools {
            if !check_tool_available(tool).await {
                warn!(tool = %tool.display(), "Tool not found; invocations will fail");
            }
        }
    }
}

/// Per-OS default tool locations, used when `[tools]` leaves a field
/// unset.
struct Defaults {
    repair_tool: &'static str,
    mesh_tool: &'static str,
    uv_tool: &'static str,
    archive_tool: &'static str,
}

impl Defaults {
    fn for_os(os: OsKind) -> Self {
        match os {
            // Bare names resolved via PATH. The repair tool is never
            // launched under ServerDecimate; the name is kept so the
            // profile is fully populated on every platform.
            OsKind::Linux => Self {
                repair_tool: "StudioCORE.exe",
                mesh_tool: "meshlabserver",
                uv_tool: "make-uv",
                archive_tool: "7z",
            },
            OsKind::Windows => Self {
                repair_tool: r"C:\Program Files\Geomagic\Foundation 2013\StudioCORE.exe",
                mesh_tool: r"C:\Program Files\VCG\MeshLab\meshlabserver.exe",
                uv_tool: r"C:\Program Files\Graphite\bin\make-uv.exe",
                archive_tool: "7z",
            },
        }
    }
}

/// Pick the configured path over the default, absolutizing relative
/// paths that carry a directory component. Bare names stay bare for
/// PATH resolution.
fn resolve_tool(configured: Option<&Path>, default: &str) -> Result<PathBuf, ConfigError> {
    let path = match configured {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(default),
    };

    if path.is_absolute() || path.components().count() == 1 {
        return Ok(path);
    }
    absolutize(&path)
}

/// Make a path absolute against the current directory.
fn absolutize(path: &Path) -> Result<PathBuf, ConfigError> {
    std::path::absolute(path).map_err(|source| ConfigError::ResolvePath {
        path: path.to_path_buf(),
        source,
    })
}
