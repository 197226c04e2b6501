use super::Repository;
use crate::error::GitResult;
use crate::git::parser::{self, CommitRecord};
use crate::git::scope::ConfigScope;

impl Repository {
    /// Configured remote names
    pub fn remotes(&self) -> GitResult<Vec<String>> {
        let output = self.run(&["remote", "show"])?;
        Ok(parser::parse_remote_list(&output))
    }

    pub fn add_remote(&self, name: &str, url: &str) -> GitResult<()> {
        self.run(&["remote", "add", name, url])?;
        Ok(())
    }

    /// `remote.pushDefault`, else the only remote if there is exactly one
    pub fn default_remote(&self) -> GitResult<Option<String>> {
        if let Some(remote) = self
            .get_config(ConfigScope::Unspecified, "remote.pushdefault")?
            .filter(|remote| !remote.trim().is_empty())
        {
            return Ok(Some(remote.trim().to_string()));
        }

        let mut remotes = self.remotes()?;
        if remotes.len() == 1 {
            Ok(remotes.pop())
        } else {
            Ok(None)
        }
    }

    fn fetch_args(remote: Option<&str>) -> Vec<&str> {
        let mut args = vec!["fetch"];
        args.extend(remote);
        args.extend(["--progress", "-v"]);
        args
    }

    /// Fetch from `remote`, or from the branch's default remote when `None`
    pub fn fetch(&self, remote: Option<&str>) -> GitResult<()> {
        self.run(&Self::fetch_args(remote))?;
        Ok(())
    }

    /// Fetch, passing git's progress lines (written to stderr) to `on_progress`
    pub fn fetch_with_progress(
        &self,
        remote: Option<&str>,
        on_progress: &mut dyn FnMut(&str),
    ) -> GitResult<()> {
        self.executor.run_with_sinks(
            &self.current_dir(),
            &Self::fetch_args(remote),
            self.executor.timeout(),
            &mut |_: &str| {},
            on_progress,
        )?;
        Ok(())
    }

    pub fn fetch_all(&self) -> GitResult<()> {
        self.run(&["fetch", "--all", "--progress", "-v"])?;
        Ok(())
    }

    /// Merge-pull the upstream branch and return the new HEAD
    pub fn pull(&self) -> GitResult<Option<CommitRecord>> {
        self.run(&["pull", "--progress", "-v", "--no-rebase"])?;
        self.head_commit()
    }
}
