use super::Repository;
use crate::error::GitResult;
use crate::git::parser::{self, DescribeInfo, TagInfo};

/// Glob matching version tags such as `v1.0.0`
pub const VERSION_TAG_PATTERN: &str = "v*";

/// `describe` exits 128 both when nothing can be described and on real
/// failures; these stderr fragments (printed under `LC_ALL=C`) mark the former.
const NOTHING_TO_DESCRIBE: [&str; 3] = [
    "No names found",
    "can describe",
    "Not a valid object name",
];

fn nothing_to_describe(code: i32, stderr: &str) -> bool {
    code == 128 && NOTHING_TO_DESCRIBE.iter().any(|text| stderr.contains(text))
}

impl Repository {
    /// Every tag
    pub fn tags(&self) -> GitResult<Vec<String>> {
        self.list_tags(None, None, None)
    }

    /// `git tag -l [--sort=<key>] [<pattern>]`, truncated to `limit` tags
    pub fn list_tags(
        &self,
        pattern: Option<&str>,
        sort_key: Option<&str>,
        limit: Option<usize>,
    ) -> GitResult<Vec<String>> {
        let mut args = vec!["tag".to_string(), "-l".to_string()];
        if let Some(key) = sort_key.filter(|key| !key.is_empty()) {
            args.push(format!("--sort={}", key));
        }
        if let Some(pattern) = pattern.filter(|pattern| !pattern.is_empty()) {
            args.push(pattern.to_string());
        }

        let output = self.run(&args)?;
        Ok(parser::parse_tag_list(&output, limit))
    }

    /// Tags matching [`VERSION_TAG_PATTERN`], optionally sorted by a
    /// `--sort` field such as `version:refname` or `creatordate`
    pub fn version_tags(
        &self,
        sort_field: Option<&str>,
        ascending: bool,
        limit: Option<usize>,
    ) -> GitResult<Vec<String>> {
        let sort_key = sort_field.map(|field| {
            if ascending {
                field.to_string()
            } else {
                format!("-{}", field)
            }
        });
        self.list_tags(Some(VERSION_TAG_PATTERN), sort_key.as_deref(), limit)
    }

    /// `describe --tags --long` of HEAD; `None` when no tag is reachable
    pub fn describe(&self, pattern: Option<&str>) -> GitResult<Option<DescribeInfo>> {
        // --long keeps the output shape stable when HEAD is exactly on a tag
        let mut args = vec!["describe", "--tags", "--long"];
        if let Some(pattern) = pattern.filter(|pattern| !pattern.is_empty()) {
            args.push("--match");
            args.push(pattern);
        }

        Ok(self
            .lookup_with(&args, nothing_to_describe)?
            .and_then(|output| parser::parse_describe(&output)))
    }

    /// Nearest tag reachable from HEAD
    pub fn latest_tag(&self, pattern: Option<&str>) -> GitResult<Option<String>> {
        Ok(self.describe(pattern)?.map(|info| info.tag))
    }

    pub fn latest_version_tag(&self) -> GitResult<Option<String>> {
        self.latest_tag(Some(VERSION_TAG_PATTERN))
    }

    /// Commits between the nearest tag and HEAD
    pub fn tag_distance(&self, pattern: Option<&str>) -> GitResult<Option<u32>> {
        Ok(self.describe(pattern)?.map(|info| info.distance))
    }

    pub fn version_tag_distance(&self) -> GitResult<Option<u32>> {
        self.tag_distance(Some(VERSION_TAG_PATTERN))
    }

    /// True when `describe --tags <tag>` names the tag itself
    pub fn tag_exists(&self, tag: &str) -> GitResult<bool> {
        Ok(self
            .lookup_with(&["describe", "--tags", tag], nothing_to_describe)?
            .is_some_and(|output| output.trim() == tag))
    }

    /// Tag, target commit, tagger (or author) and time from `git show`;
    /// `None` when `refs/tags/<tag>` does not exist
    pub fn tag_info(&self, tag: &str) -> GitResult<Option<TagInfo>> {
        let tag_ref = format!("refs/tags/{}", tag);
        if self
            .lookup(&["rev-parse", "--verify", "--quiet", tag_ref.as_str()], &[1])?
            .is_none()
        {
            return Ok(None);
        }

        let output = self.run(&["show", "-s", "--date=iso", tag_ref.as_str()])?;
        Ok(parser::parse_tag_show(tag, &output))
    }

    pub fn has_tag(&self, tag: &str) -> GitResult<bool> {
        Ok(self.tag_info(tag)?.is_some())
    }

    /// Lightweight tag on `commit`, or on HEAD when `None`
    pub fn create_tag(&self, tag: &str, commit: Option<&str>) -> GitResult<()> {
        let mut args = vec!["tag", tag];
        args.extend(commit);
        self.run(&args)?;
        Ok(())
    }

    pub fn delete_tag(&self, tag: &str) -> GitResult<()> {
        self.run(&["tag", "-d", tag])?;
        Ok(())
    }

    pub fn push_tag(&self, remote: &str, tag: &str) -> GitResult<()> {
        self.run(&["push", remote, tag])?;
        Ok(())
    }

    pub fn push_tags(&self, remote: &str) -> GitResult<()> {
        self.run(&["push", remote, "--tags"])?;
        Ok(())
    }

    /// Detach HEAD at `tag`
    pub fn checkout_tag(&self, tag: &str) -> GitResult<()> {
        self.run(&["checkout", tag])?;
        Ok(())
    }

    /// Create `new_branch` at `tag` and check it out
    pub fn checkout_tag_as_branch(&self, tag: &str, new_branch: &str) -> GitResult<()> {
        self.run(&["checkout", "-b", new_branch, tag])?;
        Ok(())
    }
}
