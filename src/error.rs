use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Not a git repository")]
    NotARepository,

    #[error("Failed to launch '{program}': {source}")]
    ProcessLaunchFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Command '{command}' timed out after {timeout:?} and was terminated")]
    ProcessTimedOut { command: String, timeout: Duration },

    /// Nonzero exit. `exit_code` is `None` when the process died from a signal.
    #[error("Git command failed: {message}")]
    CommandFailed {
        exit_code: Option<i32>,
        message: String,
    },

    #[error("Failed to parse git output: {0}")]
    ParseError(String),

    #[error("Path already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Git version {0} is too old. Minimum required: 2.26")]
    GitVersionTooOld(String),

    #[error("Failed to detect git version: {0}")]
    GitVersionDetectionFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl GitError {
    /// True for the forced-termination outcome, as opposed to a voluntary exit
    pub fn is_timeout(&self) -> bool {
        matches!(self, GitError::ProcessTimedOut { .. })
    }

    /// Exit code of a failed command, if the process exited on its own
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            GitError::CommandFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

/// Result type for git operations
pub type GitResult<T> = std::result::Result<T, GitError>;
