//! Per-operation methods over a repository path.
//!
//! Every method builds an explicit argument vector, runs it through the
//! [`GitExecutor`] in the repository directory (or the active
//! [`WorkDirGuard`] override) and hands stdout to the matching parser.

mod branch;
mod commit;
mod config;
mod remote;
mod tag;

pub use commit::LogQuery;
pub use tag::VERSION_TAG_PATTERN;

use crate::config::Settings;
use crate::error::{GitError, GitResult};
use crate::git::executor::GitExecutor;
use crate::git::parser::{self, DiffStatusSet, ShortlogEntry};
use crate::git::version::GitVersion;
use std::env;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

/// A git repository on disk and the executor used to drive it
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    executor: GitExecutor,
    /// Sub-directory set by [`Repository::begin_directory`], relative to `path`
    work_dir: Option<PathBuf>,
}

impl Repository {
    /// Handle for a repository at `path` using the default executor.
    /// Nothing is checked until the first command runs.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_executor(path, GitExecutor::new())
    }

    pub fn with_executor<P: AsRef<Path>>(path: P, executor: GitExecutor) -> Self {
        let path = path.as_ref();
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

        Self {
            path,
            executor,
            work_dir: None,
        }
    }

    pub fn with_settings<P: AsRef<Path>>(path: P, settings: &Settings) -> Self {
        Self::with_executor(path, settings.executor())
    }

    /// Startup entry point: check that the configured git is at least
    /// [`MIN_GIT_VERSION`](crate::git::version::MIN_GIT_VERSION), then find the
    /// work tree containing `start_path`.
    pub fn open<P: AsRef<Path>>(start_path: P, settings: &Settings) -> GitResult<Self> {
        let executor = settings.executor();
        let version = GitVersion::validate(&executor)?;
        tracing::debug!("Using {} {}", executor.program(), version);

        Self::discover_with(start_path, executor)
    }

    /// Detect git repository from current working directory
    pub fn discover() -> GitResult<Self> {
        let current_dir = env::current_dir()?;
        Self::discover_from(current_dir)
    }

    /// Find the work tree containing `start_path` with `rev-parse --show-toplevel`
    pub fn discover_from<P: AsRef<Path>>(start_path: P) -> GitResult<Self> {
        Self::discover_with(start_path, GitExecutor::new())
    }

    pub fn discover_with<P: AsRef<Path>>(start_path: P, executor: GitExecutor) -> GitResult<Self> {
        let output = executor.try_run(start_path.as_ref(), &["rev-parse", "--show-toplevel"])?;
        match output.error {
            None => {
                let root = output.stdout.trim();
                if root.is_empty() {
                    return Err(GitError::NotARepository);
                }
                Ok(Self::with_executor(root, executor))
            }
            Some(GitError::CommandFailed { .. }) => Err(GitError::NotARepository),
            Some(err) => Err(err),
        }
    }

    /// Get the repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn executor(&self) -> &GitExecutor {
        &self.executor
    }

    /// The override set by the innermost live [`WorkDirGuard`], if any
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    /// Directory commands run in: the repository root or the override below it
    pub fn current_dir(&self) -> PathBuf {
        match &self.work_dir {
            Some(dir) => self.path.join(dir),
            None => self.path.clone(),
        }
    }

    /// Join path segments onto the repository root
    pub fn combine<I, S>(&self, parts: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        let mut path = self.path.clone();
        for part in parts {
            path.push(part);
        }
        path
    }

    /// Run git with `args` in [`current_dir`](Self::current_dir)
    pub fn run<S: AsRef<str>>(&self, args: &[S]) -> GitResult<String> {
        self.executor.run(&self.current_dir(), args)
    }

    /// Run git, treating the listed exit codes as "nothing found".
    ///
    /// Any other failed exit, a launch failure or a timeout is an error.
    pub fn lookup<S: AsRef<str>>(
        &self,
        args: &[S],
        absent_codes: &[i32],
    ) -> GitResult<Option<String>> {
        self.lookup_with(args, |code, _| absent_codes.contains(&code))
    }

    /// Like [`lookup`](Self::lookup), with `is_absent` deciding from the exit
    /// code and stderr. Needed for commands that report a missing object
    /// with the same code as a real failure.
    pub fn lookup_with<S, F>(&self, args: &[S], is_absent: F) -> GitResult<Option<String>>
    where
        S: AsRef<str>,
        F: Fn(i32, &str) -> bool,
    {
        let output = self.executor.try_run(&self.current_dir(), args)?;
        match output.error {
            None => Ok(Some(output.stdout)),
            Some(GitError::CommandFailed {
                exit_code: Some(code),
                ..
            }) if is_absent(code, &output.stderr) => Ok(None),
            Some(err) => Err(err),
        }
    }

    /// Create the directory and run `git init` in it
    pub fn init(&self) -> GitResult<()> {
        self.create_target_dir()?;
        let dir = self.path.to_string_lossy().into_owned();
        self.executor.run(&self.path, &["init", dir.as_str()])?;

        if !self.path.join(".git").exists() {
            return Err(GitError::NotARepository);
        }
        Ok(())
    }

    /// Clone `url` into this repository's (not yet existing) path
    pub fn clone_from_url(&self, url: &str) -> GitResult<()> {
        self.create_target_dir()?;
        let dir = self.path.to_string_lossy().into_owned();
        self.executor.run(&self.path, &["clone", url, dir.as_str()])?;
        Ok(())
    }

    fn create_target_dir(&self) -> GitResult<()> {
        if self.path.exists() {
            return Err(GitError::AlreadyExists(self.path.clone()));
        }
        std::fs::create_dir_all(&self.path)?;
        Ok(())
    }

    pub fn is_inside_work_tree(&self) -> GitResult<bool> {
        self.rev_parse_flag("--is-inside-work-tree")
    }

    pub fn is_inside_git_dir(&self) -> GitResult<bool> {
        self.rev_parse_flag("--is-inside-git-dir")
    }

    fn rev_parse_flag(&self, flag: &str) -> GitResult<bool> {
        let output = self.lookup_with(&["rev-parse", flag], |_, stderr| {
            stderr.contains("not a git repository")
        })?;
        Ok(output.is_some_and(|out| out.trim() == "true"))
    }

    /// Top-level directory of the work tree containing [`current_dir`](Self::current_dir)
    pub fn repository_root(&self) -> GitResult<PathBuf> {
        let root = self.run(&["rev-parse", "--show-toplevel"])?;
        Ok(PathBuf::from(root.trim()))
    }

    /// Run subsequent commands in `dir` (relative to the repository root)
    /// until the returned guard is dropped. `status` and log queries are then
    /// limited to that sub-directory.
    pub fn begin_directory<P: AsRef<Path>>(&mut self, dir: P) -> WorkDirGuard<'_> {
        let previous = self.work_dir.replace(dir.as_ref().to_path_buf());
        WorkDirGuard {
            repo: self,
            previous,
        }
    }

    /// Restrict a path-aware command to the work-dir override
    fn push_pathspec(&self, args: &mut Vec<String>) {
        if self.work_dir.is_some() {
            args.push("--".to_string());
            args.push(".".to_string());
        }
    }

    /// Modified, deleted and untracked paths from `git status`
    pub fn status(&self) -> GitResult<DiffStatusSet> {
        let mut args = vec!["status".to_string()];
        self.push_pathspec(&mut args);

        let output = self.run(&args)?;
        Ok(parser::parse_status(&output))
    }

    /// True when tracked files were modified or deleted
    pub fn has_changes(&self) -> GitResult<bool> {
        Ok(self.status()?.has_changes())
    }

    /// Modified paths followed by deleted paths
    pub fn changed_files(&self) -> GitResult<Vec<String>> {
        Ok(self.status()?.changed_files())
    }

    /// Commit counts per author on HEAD, most active first
    pub fn shortlog(&self) -> GitResult<Vec<ShortlogEntry>> {
        // An explicit revision keeps shortlog from reading stdin
        let output = self.run(&["shortlog", "-sn", "HEAD"])?;
        Ok(parser::parse_shortlog(&output))
    }

    /// Commit count of one author, zero if absent
    pub fn author_commit_count(&self, author: &str) -> GitResult<u32> {
        Ok(self
            .shortlog()?
            .into_iter()
            .find(|entry| entry.author == author)
            .map_or(0, |entry| entry.commits))
    }

    /// Commit id of every line of `file`, in line order
    pub fn blame(&self, file: &str) -> GitResult<Vec<String>> {
        let output = self.run(&["blame", "--", file])?;
        Ok(parser::parse_blame_commits(&output))
    }
}

/// Scoped work-directory override returned by [`Repository::begin_directory`].
///
/// Derefs to the repository; dropping it restores the previous override,
/// including during unwinding.
#[derive(Debug)]
pub struct WorkDirGuard<'a> {
    repo: &'a mut Repository,
    previous: Option<PathBuf>,
}

impl Deref for WorkDirGuard<'_> {
    type Target = Repository;

    fn deref(&self) -> &Repository {
        self.repo
    }
}

impl DerefMut for WorkDirGuard<'_> {
    fn deref_mut(&mut self) -> &mut Repository {
        self.repo
    }
}

impl Drop for WorkDirGuard<'_> {
    fn drop(&mut self) {
        self.repo.work_dir = self.previous.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::panic::{self, AssertUnwindSafe};
    use std::process::Command;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let repo_path = temp_dir.path().to_path_buf();

        // Initialize git repo
        Command::new("git")
            .args(["init"])
            .current_dir(&repo_path)
            .output()
            .unwrap();

        // Configure git
        Command::new("git")
            .args(["config", "user.name", "Test User"])
            .current_dir(&repo_path)
            .output()
            .unwrap();

        Command::new("git")
            .args(["config", "user.email", "test@example.com"])
            .current_dir(&repo_path)
            .output()
            .unwrap();

        (temp_dir, repo_path)
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let (_temp, repo_path) = create_test_repo();

        // Create subdirectory
        let sub_dir = repo_path.join("subdir");
        fs::create_dir(&sub_dir).unwrap();

        let repo = Repository::discover_from(&sub_dir).unwrap();

        // Canonicalize both paths for comparison (handles symlinks on macOS)
        assert_eq!(
            repo.path().canonicalize().unwrap(),
            repo_path.canonicalize().unwrap()
        );
    }

    #[test]
    fn test_open_checks_git_and_discovers() {
        let (_temp, repo_path) = create_test_repo();
        fs::create_dir(repo_path.join("nested")).unwrap();

        let repo = Repository::open(repo_path.join("nested"), &Settings::default()).unwrap();
        assert_eq!(
            repo.path().canonicalize().unwrap(),
            repo_path.canonicalize().unwrap()
        );
    }

    #[test]
    fn test_open_without_git_program() {
        let (_temp, repo_path) = create_test_repo();
        let mut settings = Settings::default();
        settings.git.program = "no-such-git-binary".to_string();

        assert!(matches!(
            Repository::open(&repo_path, &settings),
            Err(GitError::GitVersionDetectionFailed(_))
        ));
    }

    #[test]
    fn test_discover_not_a_repo() {
        let temp_dir = TempDir::new().unwrap();
        let result = Repository::discover_from(temp_dir.path());

        assert!(matches!(result.unwrap_err(), GitError::NotARepository));
    }

    #[test]
    fn test_inside_work_tree() {
        let (_temp, repo_path) = create_test_repo();
        let repo = Repository::new(&repo_path);

        assert!(repo.is_inside_work_tree().unwrap());
        assert!(!repo.is_inside_git_dir().unwrap());
        assert_eq!(
            repo.repository_root().unwrap().canonicalize().unwrap(),
            repo_path.canonicalize().unwrap()
        );

        let outside = TempDir::new().unwrap();
        assert!(!Repository::new(outside.path()).is_inside_work_tree().unwrap());
    }

    #[test]
    fn test_init_creates_repository() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::new(temp.path().join("fresh"));

        repo.init().unwrap();
        assert!(repo.path().join(".git").is_dir());
        assert!(repo.is_inside_work_tree().unwrap());
    }

    #[test]
    fn test_init_refuses_existing_path() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::new(temp.path());

        assert!(matches!(repo.init(), Err(GitError::AlreadyExists(_))));
    }

    #[test]
    fn test_status_of_new_files() {
        let (_temp, repo_path) = create_test_repo();
        let repo = Repository::new(&repo_path);

        assert!(repo.status().unwrap().is_empty());

        fs::write(repo_path.join("test.txt"), "test content").unwrap();
        let status = repo.status().unwrap();
        assert_eq!(status.untracked, vec!["test.txt"]);
        assert!(!repo.has_changes().unwrap());
    }

    #[test]
    fn test_work_dir_guard_restores() {
        let (_temp, repo_path) = create_test_repo();
        fs::create_dir(repo_path.join("sub")).unwrap();
        let mut repo = Repository::new(&repo_path);

        {
            let guard = repo.begin_directory("sub");
            assert_eq!(guard.work_dir(), Some(Path::new("sub")));
            assert_eq!(guard.current_dir(), guard.path().join("sub"));
        }
        assert_eq!(repo.work_dir(), None);
        assert_eq!(repo.current_dir(), repo.path());
    }

    #[test]
    fn test_work_dir_guard_nested() {
        let (_temp, repo_path) = create_test_repo();
        let mut repo = Repository::new(&repo_path);

        {
            let mut outer = repo.begin_directory("a");
            {
                let inner = outer.begin_directory("a/b");
                assert_eq!(inner.work_dir(), Some(Path::new("a/b")));
            }
            assert_eq!(outer.work_dir(), Some(Path::new("a")));
        }
        assert_eq!(repo.work_dir(), None);
    }

    #[test]
    fn test_work_dir_guard_restores_on_panic() {
        let (_temp, repo_path) = create_test_repo();
        let mut repo = Repository::new(&repo_path);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = repo.begin_directory("sub");
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(repo.work_dir(), None);
    }

    #[test]
    fn test_status_limited_to_work_dir() {
        let (_temp, repo_path) = create_test_repo();
        fs::create_dir(repo_path.join("sub")).unwrap();
        fs::write(repo_path.join("top.txt"), "x").unwrap();
        fs::write(repo_path.join("sub").join("inner.txt"), "y").unwrap();
        let mut repo = Repository::new(&repo_path);

        let all = repo.status().unwrap();
        assert_eq!(all.untracked, vec!["sub/", "top.txt"]);

        let guard = repo.begin_directory("sub");
        let scoped = guard.status().unwrap();
        assert_eq!(scoped.untracked, vec!["inner.txt"]);
    }

    #[test]
    fn test_combine() {
        let repo = Repository::new("/tmp/repo");
        assert_eq!(
            repo.combine(["Assets", "file.txt"]),
            PathBuf::from("/tmp/repo/Assets/file.txt")
        );
    }
}
