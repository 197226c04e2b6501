use super::split_lines;

/// Commit id of every line in default `git blame` output, in file order.
/// The `^` boundary-commit marker is stripped.
pub fn parse_blame_commits(output: &str) -> Vec<String> {
    split_lines(output)
        .into_iter()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let id = parts.next()?;
            // annotation text always follows the id
            parts.next()?;
            let id = id.trim_start_matches('^');
            (!id.is_empty()).then(|| id.to_string())
        })
        .collect()
}
