//! External tool invocation.
//!
//! Runs mesh-processing tools as child processes: fire-and-wait, no
//! output capture. The child inherits stdout/stderr so tool logs land
//! in the operator's console, and the full argument vector is logged
//! before launch so any invocation can be replayed by hand.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;
use tracing::{info, warn};

/// Errors from external tool invocation
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool executable could not be started
    #[error("Failed to launch '{program}': {source}")]
    Launch {
        /// The program that failed to start
        program: String,
        /// The underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The tool exited with a non-zero code under the strict policy
    #[error("'{program}' exited with code {code}")]
    ExitStatus {
        /// The program that failed
        program: String,
        /// The exit code
        code: i32,
    },

    /// The tool was terminated by a signal before exiting
    #[error("'{program}' was terminated by a signal")]
    Terminated {
        /// The program that was terminated
        program: String,
    },
}

/// How a non-zero exit status is treated.
///
/// `Lenient` exists for the surface-repair tool, which reports a
/// non-zero status even when its macro completed successfully. Launch
/// failures are fatal under both policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitPolicy {
    /// Non-zero exit status is an error.
    Strict,
    /// Exit status is ignored.
    Lenient,
}

/// A fully specified external tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCommand {
    /// The program to run: an absolute path, or a bare name resolved
    /// via the system PATH
    pub program: PathBuf,
    /// Argument vector
    pub args: Vec<String>,
    /// Working directory for the child; the orchestrator's own working
    /// directory is never changed
    pub working_dir: Option<PathBuf>,
    /// How the exit status is treated
    pub policy: ExitPolicy,
}

impl ToolCommand {
    /// Create a strict invocation with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            policy: ExitPolicy::Strict,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a path argument.
    pub fn arg_path(mut self, path: impl AsRef<Path>) -> Self {
        self.args.push(path.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Set the child's working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Ignore the exit status of this invocation.
    pub fn lenient(mut self) -> Self {
        self.policy = ExitPolicy::Lenient;
        self
    }

    /// The program's file name, for error reporting.
    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

/// Run an external tool to completion.
///
/// Blocks (asynchronously) until the child terminates; nothing is
/// streamed back. Non-zero exit handling follows the command's
/// [`ExitPolicy`].
pub async fn run_tool(tool: &ToolCommand) -> Result<(), ToolError> {
    info!(
        program = %tool.program.display(),
        args = ?tool.args,
        working_dir = ?tool.working_dir,
        "Running external tool"
    );

    let mut cmd = Command::new(&tool.program);
    cmd.args(&tool.args).stdin(Stdio::null()).kill_on_drop(true);

    if let Some(ref dir) = tool.working_dir {
        cmd.current_dir(dir);
    }

    let status = cmd.status().await.map_err(|source| ToolError::Launch {
        program: tool.program_name(),
        source,
    })?;

    if status.success() {
        return Ok(());
    }

    match (tool.policy, status.code()) {
        (ExitPolicy::Lenient, code) => {
            warn!(
                program = %tool.program.display(),
                code = ?code,
                "Tool reported a non-zero exit status; ignoring per policy"
            );
            Ok(())
        }
        (ExitPolicy::Strict, Some(code)) => Err(ToolError::ExitStatus {
            program: tool.program_name(),
            code,
        }),
        (ExitPolicy::Strict, None) => Err(ToolError::Terminated {
            program: tool.program_name(),
        }),
    }
}

/// Check whether a tool can be invoked.
///
/// A path with a directory component must exist on disk; a bare name
/// must be resolvable via the system PATH (`which`/`where`). Advisory
/// only: the authoritative failure is the launch error at invocation
/// time.
pub async fn check_tool_available(program: &Path) -> bool {
    if program.components().count() > 1 {
        return program.exists();
    }

    let finder = if cfg!(target_os = "windows") {
        "where"
    } else {
        "which"
    };

    let result = Command::new(finder)
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match result {
        Ok(status) => status.success(),
        Err(_) => false,
    }
}
