pub mod config;
pub mod error;
pub mod git;
pub mod logging;

// Re-export commonly used types for convenience
pub use config::Settings;
pub use error::{GitError, GitResult};
pub use git::{
    CommitRecord, ConfigScope, DiffStatusSet, GitExecutor, GitVersion, LogQuery, Repository,
    TagInfo,
};
