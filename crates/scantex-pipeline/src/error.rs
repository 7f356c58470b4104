//! Unified error type for the conversion pipeline.
//!
//! Subsystem errors (tool invocation, configuration, filesystem) are
//! consolidated into a single `PipelineError` enum alongside the
//! pipeline's own job and stage errors.

use std::path::PathBuf;

use thiserror::Error;

use scantex_core::config::ConfigError;
use scantex_core::exec::ToolError;

/// Unified error type for all pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    // --- Job validation errors ---
    /// Input mesh does not exist or is not a regular file.
    #[error("Input mesh not found: {path}")]
    InputMissing {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Output parent directory does not exist.
    #[error("Output directory does not exist: {path}")]
    OutputDirMissing {
        /// The directory that was expected to exist.
        path: PathBuf,
    },

    /// Output path has no filename stem to derive artifact names from.
    #[error("Output path has no filename stem: {path}")]
    NoOutputStem {
        /// The offending output path.
        path: PathBuf,
    },

    // --- Stage precondition errors ---
    /// Same-directory conversion was asked to cross directories.
    #[error("Conversion input and output must share a directory: '{input_dir}' vs '{output_dir}'")]
    ConversionDirMismatch {
        /// Directory of the baked input mesh.
        input_dir: PathBuf,
        /// Directory of the requested output mesh.
        output_dir: PathBuf,
    },

    // --- Stage postcondition errors ---
    /// A stage finished without producing its output artifact.
    #[error("Stage '{stage}' did not produce {path}")]
    StageOutputMissing {
        /// The stage that ran.
        stage: &'static str,
        /// The artifact that was expected.
        path: PathBuf,
    },

    /// A stage produced an implausibly small output artifact.
    #[error("Stage '{stage}' produced a truncated output ({size} bytes): {path}")]
    StageOutputTruncated {
        /// The stage that ran.
        stage: &'static str,
        /// The truncated artifact.
        path: PathBuf,
        /// Its size in bytes.
        size: u64,
    },

    // --- Wrapped subsystem errors ---
    /// External tool invocation failed.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Configuration or platform resolution failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
