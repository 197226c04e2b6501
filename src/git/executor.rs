use crate::error::{GitError, GitResult};
use crate::git::process::{self, CommandInvocation, ExitState};
use std::path::Path;
use std::time::{Duration, Instant};

/// Default per-invocation timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Compile-time switch for the per-invocation command log
const COMMAND_LOG_DEFAULT: bool = cfg!(feature = "git-debug");

/// Result of a git command run through [`GitExecutor::try_run`]
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit: ExitState,
    pub success: bool,
    /// The failure `run` would have returned, kept for diagnostics
    pub error: Option<GitError>,
}

impl CommandOutput {
    pub fn into_result(self) -> GitResult<String> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.stdout),
        }
    }
}

/// Executes git commands and turns their exit state into a result
#[derive(Debug, Clone)]
pub struct GitExecutor {
    program: String,
    timeout: Duration,
    envs: Vec<(String, String)>,
    log_commands: bool,
}

impl Default for GitExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl GitExecutor {
    /// Executor for `git` on PATH with English messages and no credential prompts
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
            timeout: DEFAULT_TIMEOUT,
            envs: vec![
                ("LC_ALL".to_string(), "C".to_string()),
                ("GIT_TERMINAL_PROMPT".to_string(), "0".to_string()),
            ],
            log_commands: COMMAND_LOG_DEFAULT,
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Zero disables the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set an environment variable for every invocation, replacing any previous value
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.envs.retain(|(existing, _)| *existing != key);
        self.envs.push((key, value.into()));
        self
    }

    /// Drop an environment variable set by default or by [`with_env`](Self::with_env)
    pub fn without_env(mut self, key: &str) -> Self {
        self.envs.retain(|(existing, _)| existing != key);
        self
    }

    pub fn with_log_commands(mut self, enabled: bool) -> Self {
        self.log_commands = enabled || COMMAND_LOG_DEFAULT;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run git in `work_dir` and return its stdout, lines joined with `\n`
    pub fn run<S: AsRef<str>>(&self, work_dir: &Path, args: &[S]) -> GitResult<String> {
        self.run_with_timeout(work_dir, args, self.timeout)
    }

    pub fn run_with_timeout<S: AsRef<str>>(
        &self,
        work_dir: &Path,
        args: &[S],
        timeout: Duration,
    ) -> GitResult<String> {
        self.run_with_sinks(work_dir, args, timeout, &mut |_: &str| {}, &mut |_: &str| {})
    }

    /// Like [`run_with_timeout`](Self::run_with_timeout), additionally passing
    /// each output line to the given callbacks as it arrives.
    pub fn run_with_sinks<S: AsRef<str>>(
        &self,
        work_dir: &Path,
        args: &[S],
        timeout: Duration,
        on_stdout: &mut dyn FnMut(&str),
        on_stderr: &mut dyn FnMut(&str),
    ) -> GitResult<String> {
        let output = self.execute(work_dir, args, timeout, on_stdout, on_stderr)?;
        match output.error {
            Some(err) => {
                tracing::error!(
                    "{}\n{}\nArguments:\n{}",
                    work_dir.display(),
                    err,
                    join_args(args)
                );
                Err(err)
            }
            None => Ok(output.stdout),
        }
    }

    /// Run git without turning a failed exit into `Err`.
    ///
    /// Only a launch failure is returned as `Err`; the outcome of a process
    /// that did run is reported through [`CommandOutput::success`] and
    /// [`CommandOutput::error`].
    pub fn try_run<S: AsRef<str>>(&self, work_dir: &Path, args: &[S]) -> GitResult<CommandOutput> {
        self.execute(work_dir, args, self.timeout, &mut |_: &str| {}, &mut |_: &str| {})
    }

    fn execute<S: AsRef<str>>(
        &self,
        work_dir: &Path,
        args: &[S],
        timeout: Duration,
        on_stdout: &mut dyn FnMut(&str),
        on_stderr: &mut dyn FnMut(&str),
    ) -> GitResult<CommandOutput> {
        let mut invocation = CommandInvocation::new(&self.program)
            .args(args)
            .current_dir(work_dir)
            .timeout(timeout);
        for (key, value) in &self.envs {
            invocation = invocation.env(key, value);
        }
        let command = invocation.display();

        let mut stdout_lines: Vec<String> = Vec::new();
        let mut stderr_lines: Vec<String> = Vec::new();
        let started = Instant::now();

        let exit = process::run(
            invocation,
            &mut |line: &str| {
                on_stdout(line);
                stdout_lines.push(line.to_string());
            },
            &mut |line: &str| {
                on_stderr(line);
                stderr_lines.push(line.to_string());
            },
        );

        // Lines are stored without terminators; only the join adds `\n`
        let stdout = stdout_lines.join("\n");
        let stderr = (!stderr_lines.is_empty()).then(|| stderr_lines.join("\n"));
        let elapsed = started.elapsed();
        let exit = match exit {
            Ok(exit) => exit,
            Err(err) => {
                tracing::error!("{}: {}", command, err);
                return Err(err);
            }
        };

        tracing::debug!("{} ({} ms) {}", command, elapsed.as_millis(), exit);
        if self.log_commands {
            tracing::debug!(
                "{} ({} ms)\nArguments:\n{}\nResult:\n{}",
                work_dir.display(),
                elapsed.as_millis(),
                join_args(args),
                stdout
            );
        }

        let error = match exit {
            ExitState::Exited(0) => None,
            ExitState::TimedOut => Some(GitError::ProcessTimedOut {
                command,
                timeout,
            }),
            ExitState::Exited(code) => Some(GitError::CommandFailed {
                exit_code: Some(code),
                message: failure_message(stderr.as_deref(), exit),
            }),
            ExitState::Signaled(_) => Some(GitError::CommandFailed {
                exit_code: None,
                message: failure_message(stderr.as_deref(), exit),
            }),
        };

        Ok(CommandOutput {
            stdout,
            stderr: stderr.unwrap_or_default(),
            exit,
            success: error.is_none(),
            error,
        })
    }
}

/// Aggregated stderr, or a generic message when the process printed nothing
fn failure_message(stderr: Option<&str>, exit: ExitState) -> String {
    match (stderr, exit) {
        (Some(text), _) => text.to_string(),
        (None, ExitState::Exited(code)) => format!("process error ({})", code),
        (None, other) => format!("process error ({})", other),
    }
}

fn join_args<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| arg.as_ref())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
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
    fn test_failure_message() {
        assert_eq!(
            failure_message(Some("fatal: bad"), ExitState::Exited(128)),
            "fatal: bad"
        );
        assert_eq!(failure_message(None, ExitState::Exited(1)), "process error (1)");
        assert_eq!(
            failure_message(None, ExitState::Signaled(9)),
            "process error (signal 9)"
        );
    }

    #[test]
    fn test_with_env_replaces() {
        let executor = GitExecutor::new().with_env("LC_ALL", "en_US.UTF-8");
        let values: Vec<_> = executor
            .envs
            .iter()
            .filter(|(key, _)| key == "LC_ALL")
            .collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].1, "en_US.UTF-8");

        let executor = executor.without_env("LC_ALL");
        assert!(executor.envs.iter().all(|(key, _)| key != "LC_ALL"));
    }

    #[test]
    fn test_run_status() {
        let (_temp, repo_path) = create_test_repo();
        let executor = GitExecutor::new();

        let output = executor.run(&repo_path, &["status", "--porcelain"]).unwrap();
        assert_eq!(output, "");
    }

    #[test]
    fn test_run_rev_parse() {
        let (_temp, repo_path) = create_test_repo();
        let executor = GitExecutor::new();

        let output = executor
            .run(&repo_path, &["rev-parse", "--is-inside-work-tree"])
            .unwrap();
        assert_eq!(output, "true");
    }

    #[test]
    fn test_log_empty_repo_fails() {
        let (_temp, repo_path) = create_test_repo();
        let executor = GitExecutor::new();

        // Log command should fail in empty repo
        let result = executor.run(&repo_path, &["log", "--oneline"]);
        let err = result.unwrap_err();
        assert!(matches!(err, GitError::CommandFailed { .. }));
        assert_eq!(err.exit_code(), Some(128));
        assert!(err.to_string().contains("does not have any commits"));
    }

    #[test]
    fn test_try_run_keeps_error() {
        let (_temp, repo_path) = create_test_repo();
        let executor = GitExecutor::new();

        let output = executor.try_run(&repo_path, &["log", "--oneline"]).unwrap();
        assert!(!output.success);
        assert_eq!(output.exit, ExitState::Exited(128));
        assert!(!output.stderr.is_empty());
        assert!(matches!(output.error, Some(GitError::CommandFailed { .. })));
        assert!(output.into_result().is_err());
    }

    #[test]
    fn test_try_run_success() {
        let (_temp, repo_path) = create_test_repo();
        let executor = GitExecutor::new();

        let output = executor
            .try_run(&repo_path, &["config", "--get", "user.name"])
            .unwrap();
        assert!(output.success);
        assert!(output.error.is_none());
        assert_eq!(output.into_result().unwrap(), "Test User");
    }

    #[test]
    fn test_arguments_are_not_shell_interpreted() {
        let (_temp, repo_path) = create_test_repo();
        let executor = GitExecutor::new();

        executor
            .run(&repo_path, &["config", "test.value", "$(whoami) `id`; echo"])
            .unwrap();
        let value = executor
            .run(&repo_path, &["config", "--get", "test.value"])
            .unwrap();
        assert_eq!(value, "$(whoami) `id`; echo");
    }

    #[test]
    fn test_missing_program() {
        let temp = TempDir::new().unwrap();
        let executor = GitExecutor::new().with_program("no-such-git-binary");

        let result = executor.run(temp.path(), &["status"]);
        assert!(matches!(
            result.unwrap_err(),
            GitError::ProcessLaunchFailed { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_is_distinguishable() {
        let temp = TempDir::new().unwrap();
        let executor = GitExecutor::new()
            .with_program("sh")
            .with_timeout(Duration::from_millis(200));

        let err = executor.run(temp.path(), &["-c", "sleep 5"]).unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.exit_code(), None);

        let err = executor.run(temp.path(), &["-c", "exit 7"]).unwrap_err();
        assert!(!err.is_timeout());
        assert_eq!(err.exit_code(), Some(7));
        assert_eq!(err.to_string(), "Git command failed: process error (7)");
    }

    #[cfg(unix)]
    #[test]
    fn test_sinks_see_every_line() {
        let temp = TempDir::new().unwrap();
        let executor = GitExecutor::new().with_program("sh");
        let mut seen = Vec::new();

        let output = executor
            .run_with_sinks(
                temp.path(),
                &["-c", "echo a; echo; echo b; printf c"],
                Duration::from_secs(5),
                &mut |line: &str| seen.push(line.to_string()),
                &mut |_: &str| {},
            )
            .unwrap();
        assert_eq!(output, "a\n\nb\nc");
        assert_eq!(seen, vec!["a", "", "b", "c"]);
    }
}
