use super::log::commit_header;
use super::split_lines;
use crate::git::time::{epoch, parse_git_date, to_timestamp};
use chrono::{DateTime, FixedOffset};
use std::fmt;

/// A tag and the commit it points to, as read from `git show <tag>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub tag: String,
    pub commit_id: String,
    /// Tagger for annotated tags, otherwise the commit author (`Name <email>`)
    pub author: String,
    pub time: DateTime<FixedOffset>,
}

impl TagInfo {
    pub fn timestamp(&self) -> i64 {
        to_timestamp(&self.time)
    }
}

impl fmt::Display for TagInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tag: {}\nCommitId: {}\nAuthor: {}\nDate: {}",
            self.tag, self.commit_id, self.author, self.time
        )
    }
}

/// Scan `git show --date=iso <tag>` output for the first `commit`,
/// `Author:`/`Tagger:` and `Date:` headers. An annotated tag prints its
/// tagger block before the commit, so the tagger wins there.
///
/// Headers are only read inside a header block (from the start of the
/// output or a commit line up to the next blank line), so the unindented
/// message of an annotated tag is never mistaken for one. A commit line
/// counts only when its `Author:` or `Merge:` header follows.
///
/// Returns `None` when no commit line is present.
pub fn parse_tag_show(tag: &str, output: &str) -> Option<TagInfo> {
    let lines = split_lines(output);
    let mut commit_id: Option<&str> = None;
    let mut author: Option<&str> = None;
    let mut time: Option<DateTime<FixedOffset>> = None;
    let mut in_headers = true;

    for (index, raw) in lines.iter().enumerate() {
        if commit_id.is_none() {
            let opens_commit = lines.get(index + 1).is_some_and(|next| {
                next.starts_with("Author:") || next.starts_with("Merge:")
            });
            if let Some(id) = commit_header(raw).filter(|_| opens_commit) {
                commit_id = Some(id);
                in_headers = true;
                continue;
            }
        }

        let line = raw.trim();
        if line.is_empty() {
            in_headers = false;
            continue;
        }
        if !in_headers {
            continue;
        }

        if author.is_none() {
            if let Some(name) = line
                .strip_prefix("Author:")
                .or_else(|| line.strip_prefix("Tagger:"))
            {
                author = Some(name.trim());
                continue;
            }
        }

        if time.is_none() {
            if let Some(date) = line.strip_prefix("Date:") {
                time = parse_git_date(date);
            }
        }
    }

    Some(TagInfo {
        tag: tag.to_string(),
        commit_id: commit_id?.to_string(),
        author: author.unwrap_or_default().to_string(),
        time: time.unwrap_or_else(epoch),
    })
}

/// First token of each `git tag -l` line, stopping after `limit` tags
pub fn parse_tag_list(output: &str, limit: Option<usize>) -> Vec<String> {
    split_lines(output)
        .into_iter()
        .filter_map(|line| line.split_whitespace().next())
        .take(limit.unwrap_or(usize::MAX))
        .map(String::from)
        .collect()
}
