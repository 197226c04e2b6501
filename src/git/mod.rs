pub mod executor;
pub mod parser;
pub mod process;
pub mod repository;
pub mod scope;
pub mod time;
pub mod version;

// Re-export commonly used types
pub use executor::{CommandOutput, GitExecutor};
pub use parser::{
    BranchEntry, BranchRef, CommitRecord, ConfigEntry, DescribeInfo, DiffStatusSet, ShortlogEntry,
    TagInfo,
};
pub use process::{CommandInvocation, ExitState};
pub use repository::{LogQuery, Repository, WorkDirGuard};
pub use scope::ConfigScope;
pub use version::GitVersion;
