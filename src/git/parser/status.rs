use super::{split_lines, unquote_path};
use std::collections::HashSet;

/// Working-tree changes reported by `git status`.
///
/// The three lists are disjoint, ordered as git printed them, and never
/// contain empty or duplicate paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffStatusSet {
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
    pub untracked: Vec<String>,
}

impl DiffStatusSet {
    /// Number of modified plus deleted paths
    pub fn changed_count(&self) -> usize {
        self.modified.len() + self.deleted.len()
    }

    /// True when tracked files were modified or deleted; untracked files do not count
    pub fn has_changes(&self) -> bool {
        self.changed_count() > 0
    }

    /// Modified paths followed by deleted paths
    pub fn changed_files(&self) -> Vec<String> {
        self.modified
            .iter()
            .chain(self.deleted.iter())
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.deleted.is_empty() && self.untracked.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Tracked,
    Untracked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Seeking,
    /// Right after a section header, skipping `(use "git add" ...)` lines
    Hints(Section),
    Entries(Section),
}

/// Parse long-format `git status` output.
///
/// Recognizes the "Changes not staged for commit:", "Changes to be
/// committed:" and "Untracked files:" sections; a blank line ends a section.
/// Sections may repeat or be missing. Other entry kinds (new file, renamed)
/// are ignored.
pub fn parse_status(output: &str) -> DiffStatusSet {
    let mut set = DiffStatusSet::default();
    let mut seen = HashSet::new();
    let mut state = ScanState::Seeking;

    for raw in split_lines(output) {
        let line = raw.trim();
        state = match state {
            ScanState::Seeking => match section_header(line) {
                Some(section) => ScanState::Hints(section),
                None => ScanState::Seeking,
            },
            ScanState::Hints(section) if line.starts_with('(') => ScanState::Hints(section),
            ScanState::Hints(section) | ScanState::Entries(section) => {
                if line.is_empty() {
                    ScanState::Seeking
                } else {
                    record_entry(&mut set, &mut seen, section, line);
                    ScanState::Entries(section)
                }
            }
        };
    }

    set
}

fn section_header(line: &str) -> Option<Section> {
    if line.starts_with("Changes not staged for commit:")
        || line.starts_with("Changes to be committed:")
    {
        Some(Section::Tracked)
    } else if line.starts_with("Untracked") {
        Some(Section::Untracked)
    } else {
        None
    }
}

fn record_entry(set: &mut DiffStatusSet, seen: &mut HashSet<String>, section: Section, line: &str) {
    let (list, raw_path) = match section {
        Section::Tracked => {
            if let Some(path) = line.strip_prefix("modified:") {
                (&mut set.modified, path)
            } else if let Some(path) = line.strip_prefix("deleted:") {
                (&mut set.deleted, path)
            } else {
                return;
            }
        }
        Section::Untracked => (&mut set.untracked, line),
    };

    let path = unquote_path(raw_path);
    if path.is_empty() || !seen.insert(path.clone()) {
        return;
    }
    list.push(path);
}
