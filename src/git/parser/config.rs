use super::split_lines;
use crate::git::scope::ConfigScope;
use std::collections::BTreeMap;

/// One `key=value` line of `git config --list`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

/// A key reported by `git config --show-scope --name-only`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedName {
    /// `None` when git reports a scope with no mapping (e.g. `command`)
    pub scope: Option<ConfigScope>,
    pub key: String,
}

/// Entries in output order. Lines are split at the first `=` only, so values
/// may contain `=`; lines without one are skipped.
pub fn parse_config_entries(output: &str) -> Vec<ConfigEntry> {
    split_lines(output)
        .into_iter()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some(ConfigEntry {
                key: key.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// Entries folded into a map; a later duplicate key replaces the earlier value
pub fn parse_config_list(output: &str) -> BTreeMap<String, String> {
    parse_config_entries(output)
        .into_iter()
        .map(|entry| (entry.key, entry.value))
        .collect()
}

/// Parse `<scope> <key>` lines
pub fn parse_scoped_names(output: &str) -> Vec<ScopedName> {
    split_lines(output)
        .into_iter()
        .filter_map(|line| {
            let (scope, key) = line.trim().split_once(char::is_whitespace)?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some(ScopedName {
                scope: ConfigScope::from_name(scope),
                key: key.to_string(),
            })
        })
        .collect()
}
