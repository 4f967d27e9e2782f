//! Merge throughput and time-to-merge of recently closed pull requests.

use crate::config::{RepoId, MAX_PER_PAGE};
use crate::error::ReportError;
use crate::metrics::{MergeTally, ObservationWindow, PrMetrics};
use crate::pagination::{paginate, PageLimit};
use crate::source::{PullRequestQuery, RepoDataSource};
use futures::TryStreamExt;
use std::pin::pin;

#[derive(Clone, Copy, Debug)]
pub struct MergeOptions {
    pub per_page: u8,
    pub page_limit: PageLimit,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            per_page: MAX_PER_PAGE,
            page_limit: PageLimit::unlimited(),
        }
    }
}

/// Aggregates the closed pull requests into `base` created inside `window`.
///
/// Pull requests are requested newest first, so the scan stops at the first
/// one created before the window and never requests the pages after it.
pub async fn pr_merge_metrics<S>(
    source: &S,
    repo: &RepoId,
    base: &str,
    window: ObservationWindow,
    options: MergeOptions,
) -> Result<PrMetrics, ReportError>
where
    S: RepoDataSource + ?Sized,
{
    let query = PullRequestQuery {
        base: base.to_string(),
        per_page: options.per_page,
    };
    let mut tally = MergeTally::new();
    let mut pages = pin!(paginate(
        |page| source.list_pull_requests(repo, &query, page),
        options.page_limit,
    ));

    'pages: while let Some(pull_requests) = pages.try_next().await? {
        for pr in pull_requests {
            if window.predates(pr.created_at) {
                tracing::debug!(number = pr.number, "Reached pull requests older than the window");
                break 'pages;
            }
            // Newer than `now`: clock skew between us and the provider.
            if !window.contains(pr.created_at) {
                continue;
            }
            tally.record(pr.created_at, pr.merged_at);
        }
    }

    let metrics = tally.finish();
    tracing::info!(
        repo = %repo,
        base,
        scanned = metrics.scanned_count,
        merged = metrics.merged_count,
        "Aggregated pull request merge metrics"
    );

    Ok(metrics)
}
