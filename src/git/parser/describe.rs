use std::fmt;

/// Result of `git describe --tags --long`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeInfo {
    pub tag: String,
    /// Commits between the tag and the described commit
    pub distance: u32,
    /// Abbreviated commit id, without git's `g` prefix
    pub short_id: String,
}

impl fmt::Display for DescribeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-g{}", self.tag, self.distance, self.short_id)
    }
}

/// Parse `<tag>-<distance>-g<shortid>` from the first non-blank line.
///
/// The tag may itself contain hyphens, so the line is split from the right.
/// Returns `None` for fewer than two hyphens or a non-numeric distance.
pub fn parse_describe(output: &str) -> Option<DescribeInfo> {
    let line = output.lines().map(str::trim).find(|line| !line.is_empty())?;

    let (rest, id) = line.rsplit_once('-')?;
    let (tag, distance) = rest.rsplit_once('-')?;

    if tag.is_empty() || distance.is_empty() || !distance.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let distance = distance.parse().ok()?;

    let short_id = id.strip_prefix('g').unwrap_or(id);
    if short_id.is_empty() {
        return None;
    }

    Some(DescribeInfo {
        tag: tag.to_string(),
        distance,
        short_id: short_id.to_string(),
    })
}
