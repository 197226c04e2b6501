//! Parsers for the human-readable output of git commands.
//!
//! Every parser is a pure function over the aggregated stdout of one command.
//! Malformed lines are skipped, never fatal: one corrupt entry does not lose
//! the rest of the output.

pub mod blame;
pub mod config;
pub mod describe;
pub mod log;
pub mod refs;
pub mod shortlog;
pub mod status;
pub mod tag;

pub use blame::parse_blame_commits;
pub use config::{
    ConfigEntry, ScopedName, parse_config_entries, parse_config_list, parse_scoped_names,
};
pub use describe::{DescribeInfo, parse_describe};
pub use log::{CommitRecord, parse_author, parse_commit_show, parse_log};
pub use refs::{
    BranchEntry, BranchRef, parse_branch_list, parse_ref_line, parse_ref_list, parse_remote_list,
};
pub use shortlog::{ShortlogEntry, parse_shortlog};
pub use status::{DiffStatusSet, parse_status};
pub use tag::{TagInfo, parse_tag_list, parse_tag_show};

/// Split output into lines on `\n` or `\r\n`. Empty lines are kept; empty
/// input has no lines.
pub fn split_lines(output: &str) -> Vec<&str> {
    if output.is_empty() {
        return Vec::new();
    }

    output
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Parse the single integer printed by `rev-list --count`
pub fn parse_count(output: &str) -> Option<u64> {
    output.trim().parse().ok()
}

/// Remove the quotes git puts around unusual paths and decode its C-style
/// escapes (`\"`, `\\`, `\t`, octal bytes). Unquoted input is only trimmed.
pub fn unquote_path(raw: &str) -> String {
    let raw = raw.trim();
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let src = inner.as_bytes();
    let mut bytes = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        if src[i] != b'\\' || i + 1 == src.len() {
            bytes.push(src[i]);
            i += 1;
            continue;
        }

        let escaped = src[i + 1];
        if (b'0'..=b'7').contains(&escaped) {
            let mut value: u32 = 0;
            let mut digits = 0;
            while digits < 3 && i + 1 + digits < src.len() {
                let digit = src[i + 1 + digits];
                if !(b'0'..=b'7').contains(&digit) {
                    break;
                }
                value = value * 8 + u32::from(digit - b'0');
                digits += 1;
            }
            bytes.push((value & 0xff) as u8);
            i += 1 + digits;
            continue;
        }

        match escaped {
            b'n' => bytes.push(b'\n'),
            b't' => bytes.push(b'\t'),
            b'r' => bytes.push(b'\r'),
            b'a' => bytes.push(0x07),
            b'b' => bytes.push(0x08),
            b'f' => bytes.push(0x0c),
            b'v' => bytes.push(0x0b),
            b'\\' | b'"' => bytes.push(escaped),
            other => {
                bytes.push(b'\\');
                bytes.push(other);
            }
        }
        i += 2;
    }

    match String::from_utf8(bytes) {
        Ok(path) => path,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}
