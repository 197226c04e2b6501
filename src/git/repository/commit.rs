use super::Repository;
use crate::error::{GitError, GitResult};
use crate::git::parser::{self, CommitRecord};
use crate::git::time::{format_git_date, parse_git_date};
use chrono::{DateTime, FixedOffset};

/// `show -s` format read by [`parser::parse_commit_show`]
const SHOW_FORMAT: &str = "--format=%H%n%ad%n%an%n%ae%n%B";

/// Filters for [`Repository::commits`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub grep: Option<String>,
    pub author: Option<String>,
    pub before: Option<DateTime<FixedOffset>>,
    pub after: Option<DateTime<FixedOffset>>,
    /// `--tags=<pattern>`
    pub tags: Option<String>,
    /// `--branches=<pattern>`
    pub branches: Option<String>,
    pub skip: usize,
    /// Zero means no limit
    pub limit: usize,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            grep: None,
            author: None,
            before: None,
            after: None,
            tags: None,
            branches: None,
            skip: 0,
            limit: 10,
        }
    }
}

impl LogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grep(mut self, pattern: impl Into<String>) -> Self {
        self.grep = Some(pattern.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn before(mut self, time: DateTime<FixedOffset>) -> Self {
        self.before = Some(time);
        self
    }

    pub fn after(mut self, time: DateTime<FixedOffset>) -> Self {
        self.after = Some(time);
        self
    }

    pub fn tags(mut self, pattern: impl Into<String>) -> Self {
        self.tags = Some(pattern.into());
        self
    }

    pub fn branches(mut self, pattern: impl Into<String>) -> Self {
        self.branches = Some(pattern.into());
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// `git log` arguments for this query, without any pathspec
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["log".to_string(), "--date=iso".to_string()];

        if let Some(pattern) = non_empty(&self.grep) {
            args.push(format!("--grep={}", pattern));
        }
        if let Some(author) = non_empty(&self.author) {
            args.push(format!("--author={}", author));
        }
        if self.skip > 0 {
            args.push(format!("--skip={}", self.skip));
        }
        if self.limit > 0 {
            args.push(format!("--max-count={}", self.limit));
        }
        if let Some(before) = &self.before {
            args.push(format!("--before={}", format_git_date(before)));
        }
        if let Some(after) = &self.after {
            args.push(format!("--after={}", format_git_date(after)));
        }
        if let Some(tags) = non_empty(&self.tags) {
            args.push(format!("--tags={}", tags));
        }
        if let Some(branches) = non_empty(&self.branches) {
            args.push(format!("--branches={}", branches));
        }

        args
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

fn with_files(command: &str, files: &[&str]) -> Vec<String> {
    let mut args = vec![command.to_string(), "--".to_string()];
    args.extend(files.iter().map(|file| file.to_string()));
    args
}

impl Repository {
    /// Stage files
    pub fn add(&self, files: &[&str]) -> GitResult<()> {
        self.run(&with_files("add", files))?;
        Ok(())
    }

    /// Remove files from the work tree and the index
    pub fn remove(&self, files: &[&str]) -> GitResult<()> {
        self.run(&with_files("rm", files))?;
        Ok(())
    }

    pub fn rename(&self, source: &str, dest: &str) -> GitResult<()> {
        self.run(&["mv", source, dest])?;
        Ok(())
    }

    /// Commit the index
    pub fn commit(&self, message: &str) -> GitResult<()> {
        self.run(&["commit", "-m", message])?;
        Ok(())
    }

    /// Commit every modified tracked file (`commit -a`)
    pub fn commit_all(&self, message: &str) -> GitResult<()> {
        self.run(&["commit", "-a", "-m", message])?;
        Ok(())
    }

    /// Amend HEAD, keeping its message when `message` is `None`
    pub fn amend(&self, message: Option<&str>) -> GitResult<()> {
        match message {
            Some(message) => self.run(&["commit", "--amend", "-m", message])?,
            None => self.run(&["commit", "--amend", "--no-edit"])?,
        };
        Ok(())
    }

    pub fn merge(&self, branch: &str) -> GitResult<()> {
        self.run(&["merge", branch])?;
        Ok(())
    }

    pub fn cherry_pick(&self, commit: &str) -> GitResult<()> {
        self.run(&["cherry-pick", commit])?;
        Ok(())
    }

    pub fn rebase(&self, branch: &str) -> GitResult<()> {
        self.run(&["rebase", branch])?;
        Ok(())
    }

    /// Unstage everything, or with `hard` also discard work-tree changes
    pub fn reset(&self, hard: bool) -> GitResult<()> {
        if hard {
            self.run(&["reset", "--hard"])?;
        } else {
            self.run(&["reset"])?;
        }
        Ok(())
    }

    /// Move the current branch to `target`
    pub fn reset_to(&self, target: &str, hard: bool) -> GitResult<()> {
        if hard {
            self.run(&["reset", "--hard", target])?;
        } else {
            self.run(&["reset", target])?;
        }
        Ok(())
    }

    /// Restore files from `source` (a commit or branch), or from the index when `None`
    pub fn reset_files(&self, source: Option<&str>, files: &[&str]) -> GitResult<()> {
        let mut args = vec!["checkout".to_string()];
        args.extend(source.map(String::from));
        args.push("--".to_string());
        args.extend(files.iter().map(|file| file.to_string()));

        self.run(&args)?;
        Ok(())
    }

    /// Remove untracked files; git refuses without `force` unless configured otherwise
    pub fn clean(&self, force: bool) -> GitResult<()> {
        if force {
            self.run(&["clean", "-f"])?;
        } else {
            self.run(&["clean"])?;
        }
        Ok(())
    }

    /// Full id of a revision
    pub fn commit_id(&self, revision: &str) -> GitResult<String> {
        let output = self.run(&["rev-parse", revision])?;
        Ok(output.trim().to_string())
    }

    pub fn head_commit_id(&self) -> GitResult<String> {
        self.commit_id("HEAD")
    }

    /// The commit a revision names, `None` when it does not resolve to one
    pub fn find_commit(&self, revision: &str) -> GitResult<Option<CommitRecord>> {
        let spec = format!("{}^{{commit}}", revision);
        // --verify --quiet exits 1 for a revision that does not resolve
        let args = ["rev-parse", "--verify", "--quiet", spec.as_str()];
        let Some(id) = self.lookup(&args, &[1])? else {
            return Ok(None);
        };

        let output = self.run(&["show", "-s", "--date=iso", SHOW_FORMAT, id.trim()])?;
        Ok(parser::parse_commit_show(&output))
    }

    /// HEAD, or `None` in a repository without commits
    pub fn head_commit(&self) -> GitResult<Option<CommitRecord>> {
        self.find_commit("HEAD")
    }

    /// Committer time of a commit
    pub fn commit_time(&self, revision: &str) -> GitResult<DateTime<FixedOffset>> {
        let output = self.run(&["show", "-s", "--format=%ci", revision])?;
        parse_git_date(&output)
            .ok_or_else(|| GitError::ParseError(format!("Invalid commit date: {}", output.trim())))
    }

    /// Committer time of a commit in milliseconds since the Unix epoch
    pub fn commit_timestamp(&self, revision: &str) -> GitResult<i64> {
        let output = self.run(&["show", "-s", "--format=%ct", revision])?;
        let seconds: i64 = output
            .trim()
            .parse()
            .map_err(|_| GitError::ParseError(format!("Invalid commit timestamp: {}", output.trim())))?;
        Ok(seconds * 1000)
    }

    /// Number of commits reachable from `revision`
    pub fn commit_count(&self, revision: &str) -> GitResult<u64> {
        let output = self.run(&["rev-list", "--count", revision])?;
        parser::parse_count(&output)
            .ok_or_else(|| GitError::ParseError(format!("Invalid commit count: {}", output.trim())))
    }

    pub fn head_commit_count(&self) -> GitResult<u64> {
        self.commit_count("HEAD")
    }

    /// Commits on the remote-tracking ref of `branch` minus commits on
    /// `branch`; `None` when no such ref exists.
    pub fn commit_diff_count(&self, branch: &str) -> GitResult<Option<i64>> {
        let Some(remote) = self.remote_ref(branch)? else {
            return Ok(None);
        };

        let remote_count = self.commit_count(&remote.name)?;
        let local_count = self.commit_count(branch)?;
        Ok(Some(remote_count as i64 - local_count as i64))
    }

    /// Commits matching `query`, newest first. Under a work-dir override
    /// only commits touching that directory are listed.
    pub fn commits(&self, query: &LogQuery) -> GitResult<Vec<CommitRecord>> {
        let mut args = query.to_args();
        self.push_pathspec(&mut args);

        let output = self.run(&args)?;
        Ok(parser::parse_log(&output))
    }
}
