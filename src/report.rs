//! The finished report and its text and JSON renderings.

use crate::config::RepoId;
use crate::metrics::{ChangedFileList, ObservationWindow, PrMetrics};
use chrono::Duration;
use serde_json::json;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub struct RepoReport {
    pub repo: RepoId,
    pub base: String,
    pub pr_window: ObservationWindow,
    pub commit_window: ObservationWindow,
    pub pull_requests: PrMetrics,
    pub changed_files: ChangedFileList,
    /// How many of the ranked files to show.
    pub top: usize,
}

impl fmt::Display for RepoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Repository: {} (base: {})\n", self.repo, self.base)?;
        writeln!(
            f,
            "Merged PR count within {}: {}\n",
            format_window(self.pr_window.length()),
            self.pull_requests.merged_count
        )?;
        match self.pull_requests.average_merge_duration() {
            Some(average) => writeln!(f, "Average time to merge: {}\n", format_duration(average))?,
            None => writeln!(f, "Average time to merge: n/a (no merged pull requests)\n")?,
        }

        writeln!(
            f,
            "Top {} changed files within {}:",
            self.top,
            format_window(self.commit_window.length())
        )?;
        let top = self.changed_files.top(self.top);
        if top.is_empty() {
            writeln!(f, "(no changed files)")?;
        }
        for file in top {
            writeln!(f, "{}: {}", file.filename, file.count)?;
        }

        let skipped = self.changed_files.skipped_root_commits.len();
        if skipped > 0 {
            writeln!(
                f,
                "\nSkipped {} root commit(s) with no parent to diff against",
                skipped
            )?;
        }

        Ok(())
    }
}

impl RepoReport {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "repo": self.repo,
            "base": self.base,
            "pull_requests": {
                "window": self.pr_window,
                "merged_count": self.pull_requests.merged_count,
                "scanned_count": self.pull_requests.scanned_count,
                "total_merge_seconds": self.pull_requests.total_merge_duration.num_seconds(),
                "average_merge_seconds": self
                    .pull_requests
                    .average_merge_duration()
                    .map(|average| average.num_seconds()),
            },
            "changed_files": {
                "window": self.commit_window,
                "commits_examined": self.changed_files.commits_examined,
                "skipped_root_commits": self.changed_files.skipped_root_commits,
                "top": self.changed_files.top(self.top),
            },
        })
    }
}

/// Formats a duration as days, hours and minutes, e.g. `2d 4h 5m`.
pub fn format_duration(duration: Duration) -> String {
    let days = duration.num_days();
    let hours = duration.num_hours() % 24;
    let minutes = duration.num_minutes() % 60;

    let parts: Vec<String> = [(days, "d"), (hours, "h"), (minutes, "m")]
        .into_iter()
        .filter(|(value, _)| *value != 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect();

    if parts.is_empty() {
        format!("{}s", duration.num_seconds())
    } else {
        parts.join(" ")
    }
}

fn format_window(length: Duration) -> String {
    let days = length.num_days();
    if length != Duration::days(days) {
        format!("{} hours", length.num_hours())
    } else if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}
