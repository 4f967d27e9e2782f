//! The read-only view of a hosted repository that the aggregators consume.

use crate::config::RepoId;
use crate::error::ReportError;
use crate::pagination::Page;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A commit as returned by a commit listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteCommit {
    pub sha: String,
    /// `None` for a root commit.
    pub first_parent: Option<String>,
    pub committed_at: Option<DateTime<Utc>>,
}

/// One file entry of a commit comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffEntry {
    pub filename: String,
}

impl DiffEntry {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemotePullRequest {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

/// Closed pull requests into `base`, newest first.
///
/// The merge-metrics scan stops at the first pull request older than its
/// window, which is only sound with this ordering. Sources must honour it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullRequestQuery {
    pub base: String,
    pub per_page: u8,
}

#[async_trait]
pub trait RepoDataSource: Send + Sync {
    /// Lists commits made at or after `since`.
    async fn list_commits(
        &self,
        repo: &RepoId,
        since: DateTime<Utc>,
        page: u32,
    ) -> Result<Page<RemoteCommit>, ReportError>;

    /// Files changed between two commits.
    async fn compare_commits(
        &self,
        repo: &RepoId,
        base_sha: &str,
        head_sha: &str,
    ) -> Result<Vec<DiffEntry>, ReportError>;

    async fn list_pull_requests(
        &self,
        repo: &RepoId,
        query: &PullRequestQuery,
        page: u32,
    ) -> Result<Page<RemotePullRequest>, ReportError>;
}
