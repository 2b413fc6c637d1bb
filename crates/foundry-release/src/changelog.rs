use foundry_release_github::CommitSummary;

/// `* <author> - <first line of message>`
pub fn commit_line(commit: &CommitSummary) -> String {
    let subject = commit.message.lines().next().unwrap_or_default().trim_end();
    format!("* {} - {}", commit.author, subject)
}

/// One line per commit, in the order given
pub fn render_commit_log(commits: &[CommitSummary]) -> String {
    commits
        .iter()
        .map(commit_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Release body: `Release <tag>`, then a blank line and the log if non-empty
pub fn release_body(tag: &str, commit_log: Option<&str>) -> String {
    match commit_log {
        Some(log) if !log.trim().is_empty() => format!("Release {tag}\n\n{log}"),
        _ => format!("Release {tag}"),
    }
}
