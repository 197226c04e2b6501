use super::split_lines;

pub const HEADS_PREFIX: &str = "refs/heads/";
pub const REMOTES_PREFIX: &str = "refs/remotes/";
pub const TAGS_PREFIX: &str = "refs/tags/";

/// A (commit id, ref name) pair from `show-ref` or `ls-remote`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    pub commit_id: String,
    pub name: String,
}

impl BranchRef {
    pub fn is_local(&self) -> bool {
        self.name.starts_with(HEADS_PREFIX)
    }

    /// Remote-tracking ref (`refs/remotes/<remote>/<branch>`)
    pub fn is_remote(&self) -> bool {
        self.name.starts_with(REMOTES_PREFIX)
    }

    pub fn is_tag(&self) -> bool {
        self.name.starts_with(TAGS_PREFIX)
    }

    /// Name without its `refs/heads/`, `refs/remotes/` or `refs/tags/` prefix
    pub fn short_name(&self) -> &str {
        [HEADS_PREFIX, REMOTES_PREFIX, TAGS_PREFIX]
            .iter()
            .find_map(|prefix| self.name.strip_prefix(prefix))
            .unwrap_or(self.name.as_str())
    }
}

/// A branch from `git branch` / `git branch -r`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchEntry {
    pub name: String,
    pub is_current: bool,
}

/// Split one ref line on the first tab, or failing that the first run of
/// whitespace. Anything other than two non-empty fields is rejected.
pub fn parse_ref_line(line: &str) -> Option<BranchRef> {
    let line = line.trim();
    let (commit_id, name) = match line.split_once('\t') {
        Some(fields) => fields,
        None => line.split_once(char::is_whitespace)?,
    };

    let commit_id = commit_id.trim();
    let name = name.trim();
    if commit_id.is_empty()
        || name.is_empty()
        || commit_id.contains(char::is_whitespace)
        || name.contains(char::is_whitespace)
    {
        return None;
    }

    Some(BranchRef {
        commit_id: commit_id.to_string(),
        name: name.to_string(),
    })
}

pub fn parse_ref_list(output: &str) -> Vec<BranchRef> {
    split_lines(output)
        .into_iter()
        .filter_map(parse_ref_line)
        .collect()
}

/// Parse `git branch` output. The `*` marker flags the current branch,
/// detached-HEAD lines are skipped and `origin/HEAD -> origin/main` keeps
/// only its first token.
pub fn parse_branch_list(output: &str) -> Vec<BranchEntry> {
    let mut branches = Vec::new();

    for line in split_lines(output) {
        let is_current = line.starts_with('*');
        let line = line.trim_start_matches(['*', '+']).trim();

        if line.starts_with("(HEAD") || line.starts_with("(no branch") {
            continue;
        }

        let Some(name) = line.split_whitespace().next() else {
            continue;
        };

        branches.push(BranchEntry {
            name: name.to_string(),
            is_current,
        });
    }

    branches
}

/// Parse `git remote` / `git remote show`: one remote name per line
pub fn parse_remote_list(output: &str) -> Vec<String> {
    split_lines(output)
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
