use super::split_lines;
use crate::git::time::{epoch, from_timestamp, parse_git_date, to_timestamp};
use chrono::{DateTime, FixedOffset};
use std::fmt;

/// A commit as reported by `git log` or `git show`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,
    pub author_name: String,
    pub author_email: String,
    pub message: String,
    time: DateTime<FixedOffset>,
}

impl CommitRecord {
    /// Record with only an id; the time is the Unix epoch until set
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author_name: String::new(),
            author_email: String::new(),
            message: String::new(),
            time: epoch(),
        }
    }

    pub fn time(&self) -> DateTime<FixedOffset> {
        self.time
    }

    /// Milliseconds since the Unix epoch, always derived from [`time`](Self::time)
    pub fn timestamp(&self) -> i64 {
        to_timestamp(&self.time)
    }

    pub fn set_time(&mut self, time: DateTime<FixedOffset>) {
        self.time = time;
    }

    pub fn set_timestamp(&mut self, millis: i64) {
        self.time = from_timestamp(millis).fixed_offset();
    }
}

impl fmt::Display for CommitRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CommitId: {}\nDate: {}\nAuthor: {}\nEmail: {}\nMessage: {}",
            self.id, self.time, self.author_name, self.author_email, self.message
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogState {
    /// Outside any commit, or past the end of the current message
    Seeking,
    /// Between `commit <id>` and the first blank line
    Headers,
    /// Indented message lines
    Body,
}

/// Parse the default `git log` layout:
///
/// ```text
/// commit <id> (<decoration>)
/// Author: Name <email>
/// Date:   2024-01-02 10:00:00 +0100
///
///     subject
///
///     body
/// ```
///
/// Message lines are the indented ones; blank lines between them are kept
/// as part of the message, and the message ends at the next unindented line.
pub fn parse_log(output: &str) -> Vec<CommitRecord> {
    let mut commits = Vec::new();
    let mut current: Option<CommitRecord> = None;
    let mut body: Vec<&str> = Vec::new();
    let mut pending_blanks = 0;
    let mut state = LogState::Seeking;

    for line in split_lines(output) {
        if let Some(id) = commit_header(line) {
            finish(&mut commits, current.take(), &mut body);
            current = Some(CommitRecord::new(id));
            pending_blanks = 0;
            state = LogState::Headers;
            continue;
        }

        match state {
            LogState::Seeking => {}
            LogState::Headers => {
                if line.trim().is_empty() {
                    state = LogState::Body;
                } else if let Some(record) = current.as_mut() {
                    apply_header(record, line);
                }
            }
            LogState::Body => {
                if line.trim().is_empty() {
                    pending_blanks += 1;
                } else if let Some(text) = strip_indent(line) {
                    if !body.is_empty() {
                        body.extend(std::iter::repeat_n("", pending_blanks));
                    }
                    pending_blanks = 0;
                    body.push(text);
                } else {
                    // e.g. --stat output after the message
                    state = LogState::Seeking;
                }
            }
        }
    }

    finish(&mut commits, current, &mut body);
    commits
}

/// Parse `git show -s --format=%H%n%ad%n%an%n%ae%n%B`. The four header
/// fields are required; the body may be empty.
pub fn parse_commit_show(output: &str) -> Option<CommitRecord> {
    let lines = split_lines(output);
    if lines.len() < 4 {
        return None;
    }

    let id = lines[0].trim();
    if id.is_empty() {
        return None;
    }

    let mut record = CommitRecord::new(id);
    if let Some(time) = parse_git_date(lines[1]) {
        record.set_time(time);
    }
    record.author_name = lines[2].trim().to_string();
    record.author_email = lines[3].trim().to_string();
    record.message = lines[4..].join("\n").trim_end().to_string();
    Some(record)
}

/// Split `Name <email>` into its parts. Without an `<...>` suffix the whole
/// text is the name.
pub fn parse_author(text: &str) -> (String, String) {
    let text = text.trim();
    if let Some((name, email)) = text
        .strip_suffix('>')
        .and_then(|rest| rest.rsplit_once('<'))
    {
        return (name.trim().to_string(), email.trim().to_string());
    }
    (text.to_string(), String::new())
}

/// `commit <hex id>` optionally followed by decoration
pub(super) fn commit_header(line: &str) -> Option<&str> {
    let id = line.strip_prefix("commit ")?.split_whitespace().next()?;
    id.bytes().all(|b| b.is_ascii_hexdigit()).then_some(id)
}

fn apply_header(record: &mut CommitRecord, line: &str) {
    if let Some(author) = line.strip_prefix("Author:") {
        let (name, email) = parse_author(author);
        record.author_name = name;
        record.author_email = email;
    } else if let Some(date) = line.strip_prefix("Date:") {
        // An unparseable date leaves the epoch in place
        if let Some(time) = parse_git_date(date) {
            record.set_time(time);
        }
    }
}

fn strip_indent(line: &str) -> Option<&str> {
    line.strip_prefix("    ").or_else(|| line.strip_prefix('\t'))
}

fn finish(commits: &mut Vec<CommitRecord>, record: Option<CommitRecord>, body: &mut Vec<&str>) {
    if let Some(mut record) = record {
        record.message = body.join("\n");
        if !record.id.is_empty() {
            commits.push(record);
        }
    }
    body.clear();
}
