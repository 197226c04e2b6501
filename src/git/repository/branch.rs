use super::Repository;
use crate::error::GitResult;
use crate::git::parser::{self, BranchEntry, BranchRef};

impl Repository {
    /// `git branch <name>`, or `git branch --track <name> <upstream>`
    pub fn create_branch(&self, branch: &str, tracked: Option<&str>) -> GitResult<()> {
        match tracked {
            Some(upstream) => self.track_branch(branch, upstream),
            None => {
                self.run(&["branch", branch])?;
                Ok(())
            }
        }
    }

    /// Create `branch` tracking `upstream`
    pub fn track_branch(&self, branch: &str, upstream: &str) -> GitResult<()> {
        self.run(&["branch", "--track", branch, upstream])?;
        Ok(())
    }

    pub fn checkout(&self, branch: &str, create: bool) -> GitResult<()> {
        if create {
            self.run(&["checkout", "-b", branch])?;
        } else {
            self.run(&["checkout", branch])?;
        }
        Ok(())
    }

    /// Create local `branch` from `remote_branch` and check it out
    pub fn checkout_remote(&self, branch: &str, remote_branch: &str) -> GitResult<()> {
        self.run(&["checkout", "-b", branch, remote_branch])?;
        Ok(())
    }

    pub fn switch_branch(&self, branch: &str) -> GitResult<()> {
        self.run(&["switch", branch])?;
        Ok(())
    }

    /// `-d`, or `-D` when `force` is set
    pub fn delete_branch(&self, branch: &str, force: bool) -> GitResult<()> {
        let flag = if force { "-D" } else { "-d" };
        self.run(&["branch", flag, branch])?;
        Ok(())
    }

    /// Delete a remote-tracking branch such as `origin/feature`
    pub fn delete_remote_branch(&self, remote_branch: &str) -> GitResult<()> {
        self.run(&["branch", "-dr", remote_branch])?;
        Ok(())
    }

    pub fn delete_remote_tracking(&self, remote: &str, branch: &str) -> GitResult<()> {
        self.delete_remote_branch(&format!("{}/{}", remote, branch))
    }

    /// Get the current branch name; `None` on a detached HEAD
    pub fn current_branch(&self) -> GitResult<Option<String>> {
        let output = self.run(&["branch", "--show-current"])?;
        let branch = output.trim();
        if branch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(branch.to_string()))
        }
    }

    /// Local branches
    pub fn branches(&self) -> GitResult<Vec<BranchEntry>> {
        let output = self.run(&["branch"])?;
        Ok(parser::parse_branch_list(&output))
    }

    pub fn has_branch(&self, branch: &str) -> GitResult<bool> {
        Ok(self.branches()?.iter().any(|entry| entry.name == branch))
    }

    /// Remote-tracking branches, e.g. `origin/main`
    pub fn remote_branches(&self) -> GitResult<Vec<String>> {
        let output = self.run(&["branch", "-r"])?;
        Ok(parser::parse_branch_list(&output)
            .into_iter()
            .map(|entry| entry.name)
            .collect())
    }

    /// `git show-ref [pattern]`. No matching ref (exit 1) yields an empty list.
    pub fn refs(&self, pattern: Option<&str>) -> GitResult<Vec<BranchRef>> {
        let mut args = vec!["show-ref"];
        args.extend(pattern);

        let output = self.lookup(&args, &[1])?.unwrap_or_default();
        Ok(parser::parse_ref_list(&output))
    }

    /// The ref matching `branch`, preferring a remote-tracking one
    pub fn remote_ref(&self, branch: &str) -> GitResult<Option<BranchRef>> {
        let refs = self.refs(Some(branch))?;
        let remote = refs.iter().position(BranchRef::is_remote);
        Ok(match remote {
            Some(index) => refs.into_iter().nth(index),
            None => refs.into_iter().last(),
        })
    }

    /// Refs of the default remote, via `ls-remote --refs`
    pub fn ls_remote(&self) -> GitResult<Vec<BranchRef>> {
        let output = self.run(&["ls-remote", "--refs"])?;
        Ok(parser::parse_ref_list(&output))
    }
}
