//! Runs both aggregators against one repository and collects a [`RepoReport`].

use crate::changed_files::{rank_changed_files, RankOptions, RootCommitPolicy};
use crate::config::{RepoId, MAX_PER_PAGE};
use crate::error::ReportError;
use crate::merge_time::{pr_merge_metrics, MergeOptions};
use crate::metrics::ObservationWindow;
use crate::pagination::PageLimit;
use crate::report::RepoReport;
use crate::source::RepoDataSource;
use chrono::{DateTime, Duration, Utc};

/// Everything needed to produce one report.
#[derive(Clone, Debug)]
pub struct ReportRequest {
    pub repo: RepoId,
    pub base: String,
    pub pr_window: Duration,
    pub commit_window: Duration,
    pub top: usize,
    pub per_page: u8,
    pub page_limit: PageLimit,
    pub root_commits: RootCommitPolicy,
    /// Run both aggregators at the same time instead of one after the other.
    pub concurrent: bool,
}

impl ReportRequest {
    /// A request with the default top-10 listing, full pages and no page cap.
    pub fn new(
        repo: RepoId,
        base: impl Into<String>,
        pr_window: Duration,
        commit_window: Duration,
    ) -> Self {
        Self {
            repo,
            base: base.into(),
            pr_window,
            commit_window,
            top: 10,
            per_page: MAX_PER_PAGE,
            page_limit: PageLimit::unlimited(),
            root_commits: RootCommitPolicy::Skip,
            concurrent: false,
        }
    }
}

pub struct MetricsQuerier<S> {
    source: S,
}

impl<S: RepoDataSource> MetricsQuerier<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Computes both metrics with windows ending at `now`.
    ///
    /// Fails on the first remote error; no partial report is produced.
    pub async fn report(
        &self,
        request: &ReportRequest,
        now: DateTime<Utc>,
    ) -> Result<RepoReport, ReportError> {
        let pr_window = ObservationWindow::trailing(request.pr_window, now);
        let commit_window = ObservationWindow::trailing(request.commit_window, now);

        let merge_options = MergeOptions {
            per_page: request.per_page,
            page_limit: request.page_limit,
        };
        let rank_options = RankOptions {
            root_commits: request.root_commits,
            page_limit: request.page_limit,
        };

        let merges = pr_merge_metrics(
            &self.source,
            &request.repo,
            &request.base,
            pr_window,
            merge_options,
        );
        let files = rank_changed_files(&self.source, &request.repo, commit_window, rank_options);

        tracing::info!(repo = %request.repo, base = %request.base, concurrent = request.concurrent, "Collecting metrics");

        let (pull_requests, changed_files) = if request.concurrent {
            tokio::try_join!(merges, files)?
        } else {
            (merges.await?, files.await?)
        };

        Ok(RepoReport {
            repo: request.repo.clone(),
            base: request.base.clone(),
            pr_window,
            commit_window,
            pull_requests,
            changed_files,
            top: request.top,
        })
    }
}
