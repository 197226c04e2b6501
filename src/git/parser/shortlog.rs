use super::split_lines;

/// One author line of `git shortlog -sn`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortlogEntry {
    pub author: String,
    pub commits: u32,
}

/// Parse `<count>\t<author>` lines; lines whose count is not an integer are skipped
pub fn parse_shortlog(output: &str) -> Vec<ShortlogEntry> {
    split_lines(output)
        .into_iter()
        .filter_map(|line| {
            let (count, author) = line.trim().split_once(char::is_whitespace)?;
            let commits = count.parse().ok()?;
            let author = author.trim();
            if author.is_empty() {
                return None;
            }
            Some(ShortlogEntry {
                author: author.to_string(),
                commits,
            })
        })
        .collect()
}
