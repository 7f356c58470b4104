//! Error type for the archive grouping utility.

use std::path::PathBuf;

use thiserror::Error;

use scantex_core::config::ConfigError;
use scantex_core::exec::ToolError;

/// Errors from the grouping-and-archiving utility.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The source directory does not exist or is not a directory.
    #[error("Source directory not found: {path}")]
    SourceDirMissing {
        /// The directory that was expected to exist.
        path: PathBuf,
    },

    /// Archiver invocation failed.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Configuration or platform resolution failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
