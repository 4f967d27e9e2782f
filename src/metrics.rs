//! Result types and the pure aggregation state behind both reports.
//!
//! Nothing in here talks to GitHub. The aggregators feed records into a
//! [`FileTally`] or a [`MergeTally`] and turn it into a result at the end.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// The trailing interval `[start, end)` a metric is computed over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ObservationWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ObservationWindow {
    /// The window of `length` ending at `now`.
    pub fn trailing(length: Duration, now: DateTime<Utc>) -> Self {
        Self {
            start: now - length,
            end: now,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }

    /// True when `at` is older than the window.
    pub fn predates(&self, at: DateTime<Utc>) -> bool {
        at < self.start
    }

    pub fn length(&self) -> Duration {
        self.end - self.start
    }
}

/// A path touched by at least one commit in the window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChangedFile {
    pub filename: String,
    /// Number of distinct commits whose diff touched this path.
    pub count: u32,
}

/// Changed files ranked by how many commits touched them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChangedFileList {
    /// Sorted by count descending, then filename ascending.
    pub files: Vec<ChangedFile>,
    /// Commits that were diffed and counted.
    pub commits_examined: usize,
    /// Root commits left out because they have nothing to diff against.
    pub skipped_root_commits: Vec<String>,
}

impl ChangedFileList {
    pub fn top(&self, n: usize) -> &[ChangedFile] {
        &self.files[..n.min(self.files.len())]
    }
}

/// Per-filename change counter, local to one aggregation run.
#[derive(Debug, Default)]
pub struct FileTally {
    counts: HashMap<String, u32>,
    commits: usize,
}

impl FileTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every distinct filename of one commit's diff once.
    pub fn record_commit<I, S>(&mut self, filenames: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        for filename in filenames {
            let filename = filename.as_ref();
            if seen.insert(filename.to_owned()) {
                *self.counts.entry(filename.to_owned()).or_insert(0) += 1;
            }
        }
        self.commits += 1;
    }

    pub fn into_ranked(self, skipped_root_commits: Vec<String>) -> ChangedFileList {
        let mut files: Vec<ChangedFile> = self
            .counts
            .into_iter()
            .map(|(filename, count)| ChangedFile { filename, count })
            .collect();
        files.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.filename.cmp(&b.filename))
        });

        ChangedFileList {
            files,
            commits_examined: self.commits,
            skipped_root_commits,
        }
    }
}

/// Merge throughput and latency of the pull requests in a window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PrMetrics {
    pub merged_count: usize,
    /// Sum of `merged_at - created_at` over all merged pull requests.
    #[serde(serialize_with = "serialize_seconds")]
    pub total_merge_duration: Duration,
    /// Closed pull requests inside the window, merged or not.
    pub scanned_count: usize,
}

impl PrMetrics {
    /// `None` when nothing was merged; the mean is undefined then.
    pub fn average_merge_duration(&self) -> Option<Duration> {
        let merged = i32::try_from(self.merged_count).ok().filter(|n| *n > 0)?;
        Some(self.total_merge_duration / merged)
    }
}

fn serialize_seconds<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_i64(duration.num_seconds())
}

/// Running counters for [`PrMetrics`].
#[derive(Debug)]
pub struct MergeTally {
    merged_count: usize,
    total: Duration,
    scanned: usize,
}

impl Default for MergeTally {
    fn default() -> Self {
        Self {
            merged_count: 0,
            total: Duration::zero(),
            scanned: 0,
        }
    }
}

impl MergeTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, created_at: DateTime<Utc>, merged_at: Option<DateTime<Utc>>) {
        self.scanned += 1;
        if let Some(merged_at) = merged_at {
            self.merged_count += 1;
            self.total = self.total + (merged_at - created_at);
        }
    }

    pub fn finish(self) -> PrMetrics {
        PrMetrics {
            merged_count: self.merged_count,
            total_merge_duration: self.total,
            scanned_count: self.scanned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_tally_ranks_by_count() {
        let mut tally = FileTally::new();
        tally.record_commit(["a.go"]);
        tally.record_commit(["b.go"]);
        tally.record_commit(["a.go"]);

        let ranked = tally.into_ranked(vec![]);

        assert_eq!(
            ranked.files,
            vec![
                ChangedFile {
                    filename: "a.go".to_string(),
                    count: 2
                },
                ChangedFile {
                    filename: "b.go".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(ranked.commits_examined, 3);
    }

    #[test]
    fn test_file_tally_counts_duplicate_entries_once_per_commit() {
        let mut tally = FileTally::new();
        tally.record_commit(["src/lib.rs", "src/lib.rs", "README.md"]);
        tally.record_commit(["src/lib.rs"]);

        let ranked = tally.into_ranked(vec![]);
        let total: u32 = ranked.files.iter().map(|f| f.count).sum();

        assert_eq!(total, 3);
        assert_eq!(ranked.files[0].filename, "src/lib.rs");
        assert_eq!(ranked.files[0].count, 2);
    }

    #[test]
    fn test_file_tally_breaks_ties_by_filename() {
        let mut tally = FileTally::new();
        tally.record_commit(["z.rs", "m.rs", "a.rs"]);

        let names: Vec<_> = tally
            .into_ranked(vec![])
            .files
            .into_iter()
            .map(|f| f.filename)
            .collect();

        assert_eq!(names, ["a.rs", "m.rs", "z.rs"]);
    }

    #[test]
    fn test_top_clamps_to_length() {
        let mut tally = FileTally::new();
        tally.record_commit(["a.rs", "b.rs"]);
        let ranked = tally.into_ranked(vec![]);

        assert_eq!(ranked.top(10).len(), 2);
        assert_eq!(ranked.top(1).len(), 1);
        assert!(ranked.top(0).is_empty());
    }

    #[test]
    fn test_merge_tally_average() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut tally = MergeTally::new();
        tally.record(created, Some(created + Duration::days(2)));
        tally.record(created, Some(created + Duration::days(4)));
        tally.record(created, None);

        let metrics = tally.finish();

        assert_eq!(metrics.merged_count, 2);
        assert_eq!(metrics.scanned_count, 3);
        assert_eq!(metrics.total_merge_duration, Duration::days(6));
        assert_eq!(metrics.average_merge_duration(), Some(Duration::days(3)));
    }

    #[test]
    fn test_merge_tally_without_merges_has_no_average() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut tally = MergeTally::new();
        tally.record(created, None);

        let metrics = tally.finish();

        assert_eq!(metrics.merged_count, 0);
        assert_eq!(metrics.average_merge_duration(), None);
    }

    #[test]
    fn test_window_is_half_open() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let window = ObservationWindow::trailing(Duration::days(7), now);

        assert!(window.contains(now - Duration::days(7)));
        assert!(!window.contains(now));
        assert!(window.predates(now - Duration::days(7) - Duration::seconds(1)));
        assert!(!window.predates(now - Duration::days(1)));
        assert_eq!(window.length(), Duration::days(7));
    }
}
