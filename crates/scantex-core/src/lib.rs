//! Core infrastructure for the scantex toolchain.
//!
//! Everything here is shared by the pipeline and the archive utility:
//! running external tools as child processes, resolving which tools to
//! run on the current platform, and loading configuration.

pub mod config;
pub mod exec;
pub mod profile;

pub use config::{AppConfig, ConfigError};
pub use exec::{ExitPolicy, ToolCommand, ToolError, check_tool_available, run_tool};
pub use profile::{ConvertVariant, OsKind, RepairVariant, ToolProfile, UvLaunchVariant};
