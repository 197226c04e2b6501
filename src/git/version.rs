use crate::error::{GitError, GitResult};
use crate::git::executor::GitExecutor;
use std::path::Path;

/// Minimum required git version; `config --show-scope` arrived in 2.26
pub const MIN_GIT_VERSION: (u32, u32) = (2, 26);

/// Represents a git version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GitVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl GitVersion {
    /// Detect the version of the executor's git program
    pub fn detect(executor: &GitExecutor) -> GitResult<Self> {
        let output = executor
            .try_run(Path::new("."), &["--version"])
            .map_err(|e| {
                GitError::GitVersionDetectionFailed(format!(
                    "Failed to execute {}: {}",
                    executor.program(),
                    e
                ))
            })?;

        if !output.success {
            return Err(GitError::GitVersionDetectionFailed(format!(
                "{} --version failed ({})",
                executor.program(),
                output.exit
            )));
        }

        Self::parse(&output.stdout)
    }

    /// Parse `git version 2.39.2`. Vendor suffixes such as `.windows.1` or
    /// `-rc0` are ignored; a missing patch number reads as zero.
    pub fn parse(output: &str) -> GitResult<Self> {
        let output = output.trim();
        let number = output
            .strip_prefix("git version ")
            .and_then(|rest| rest.split_whitespace().next())
            .ok_or_else(|| {
                GitError::ParseError(format!("Unexpected git --version output: {}", output))
            })?;

        let mut fields = number.split('.').map(leading_number);
        match (fields.next().flatten(), fields.next().flatten()) {
            (Some(major), Some(minor)) => Ok(GitVersion {
                major,
                minor,
                patch: fields.next().flatten().unwrap_or(0),
            }),
            _ => Err(GitError::ParseError(format!(
                "Invalid git version number: {}",
                number
            ))),
        }
    }

    pub fn is_supported(&self) -> bool {
        (self.major, self.minor) >= MIN_GIT_VERSION
    }

    /// Detect the version and reject anything older than [`MIN_GIT_VERSION`]
    pub fn validate(executor: &GitExecutor) -> GitResult<Self> {
        let version = Self::detect(executor)?;
        if !version.is_supported() {
            return Err(GitError::GitVersionTooOld(version.to_string()));
        }
        Ok(version)
    }
}

/// Digits at the start of a version field, `None` if there are none
fn leading_number(field: &str) -> Option<u32> {
    let end = field
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(field.len());
    field[..end].parse().ok()
}

impl std::fmt::Display for GitVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
