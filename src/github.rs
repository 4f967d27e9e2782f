//! GitHub REST implementation of the repository data source.

use crate::config::{RepoId, MAX_PER_PAGE};
use crate::error::{RemoteFailure, ReportError};
use crate::pagination::Page;
use crate::source::{DiffEntry, PullRequestQuery, RemoteCommit, RemotePullRequest, RepoDataSource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};

/// [`RepoDataSource`] backed by the GitHub REST API.
pub struct GitHubSource {
    octocrab: Octocrab,
    per_page: u8,
}

impl GitHubSource {
    pub fn new(token: &str, per_page: u8) -> anyhow::Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()?;

        Ok(Self::with_client(octocrab, per_page))
    }

    pub fn with_client(octocrab: Octocrab, per_page: u8) -> Self {
        Self {
            octocrab,
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }
}

#[derive(Serialize)]
struct CommitListParams {
    since: DateTime<Utc>,
    per_page: u8,
    page: u32,
}

#[derive(Deserialize)]
struct CommitPayload {
    sha: String,
    #[serde(default)]
    parents: Vec<ParentPayload>,
    commit: CommitDetailPayload,
}

#[derive(Deserialize)]
struct ParentPayload {
    sha: String,
}

#[derive(Deserialize)]
struct CommitDetailPayload {
    committer: Option<SignaturePayload>,
    author: Option<SignaturePayload>,
}

#[derive(Deserialize)]
struct SignaturePayload {
    date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct ComparisonPayload {
    #[serde(default)]
    files: Vec<ComparedFilePayload>,
}

#[derive(Deserialize)]
struct ComparedFilePayload {
    filename: String,
}

impl From<CommitPayload> for RemoteCommit {
    fn from(payload: CommitPayload) -> Self {
        let committed_at = [payload.commit.committer, payload.commit.author]
            .into_iter()
            .flatten()
            .find_map(|signature| signature.date);

        RemoteCommit {
            first_parent: payload.parents.into_iter().next().map(|parent| parent.sha),
            sha: payload.sha,
            committed_at,
        }
    }
}

#[async_trait]
impl RepoDataSource for GitHubSource {
    async fn list_commits(
        &self,
        repo: &RepoId,
        since: DateTime<Utc>,
        page: u32,
    ) -> Result<Page<RemoteCommit>, ReportError> {
        let route = format!("/repos/{}/{}/commits", repo.owner, repo.repo);
        let params = CommitListParams {
            since,
            per_page: self.per_page,
            page,
        };

        let response: octocrab::Page<CommitPayload> = self
            .octocrab
            .get(route, Some(&params))
            .await
            .map_err(|e| remote_error("list commits", e))?;

        let next_page = next_page_number(&response, page);
        let commits = response.items.into_iter().map(RemoteCommit::from).collect();

        Ok(Page::new(commits, next_page))
    }

    async fn compare_commits(
        &self,
        repo: &RepoId,
        base_sha: &str,
        head_sha: &str,
    ) -> Result<Vec<DiffEntry>, ReportError> {
        let route = format!(
            "/repos/{}/{}/compare/{}...{}",
            repo.owner, repo.repo, base_sha, head_sha
        );

        let comparison: ComparisonPayload = self
            .octocrab
            .get(route, None::<&()>)
            .await
            .map_err(|e| remote_error("compare commits", e))?;

        Ok(comparison
            .files
            .into_iter()
            .map(|file| DiffEntry::new(file.filename))
            .collect())
    }

    async fn list_pull_requests(
        &self,
        repo: &RepoId,
        query: &PullRequestQuery,
        page: u32,
    ) -> Result<Page<RemotePullRequest>, ReportError> {
        let response = self
            .octocrab
            .pulls(repo.owner.clone(), repo.repo.clone())
            .list()
            .state(octocrab::params::State::Closed)
            .base(query.base.clone())
            .sort(octocrab::params::pulls::Sort::Created)
            .direction(octocrab::params::Direction::Descending)
            .per_page(query.per_page.clamp(1, MAX_PER_PAGE))
            .page(page)
            .send()
            .await
            .map_err(|e| remote_error("list pull requests", e))?;

        let next_page = next_page_number(&response, page);
        let pull_requests = response
            .items
            .into_iter()
            .filter_map(|pr| {
                let Some(created_at) = pr.created_at else {
                    tracing::warn!(number = pr.number, "Pull request without created_at, skipping");
                    return None;
                };
                Some(RemotePullRequest {
                    number: pr.number,
                    created_at,
                    merged_at: pr.merged_at,
                })
            })
            .collect();

        Ok(Page::new(pull_requests, next_page))
    }
}

/// Reads the page number out of the `next` link, if GitHub sent one.
fn next_page_number<T>(page: &octocrab::Page<T>, current: u32) -> Option<u32> {
    let next = page.next.as_ref()?;
    Some(page_from_query(next.query(), current))
}

/// The `page` parameter of a link's query string, or the page after `current`.
fn page_from_query(query: Option<&str>, current: u32) -> u32 {
    query
        .into_iter()
        .flat_map(|query| query.split('&'))
        .find_map(|pair| pair.strip_prefix("page="))
        .and_then(|value| value.parse().ok())
        .unwrap_or(current + 1)
}

fn remote_error(operation: &'static str, err: octocrab::Error) -> ReportError {
    let kind = match &err {
        octocrab::Error::GitHub { source, .. } => RemoteFailure::classify(&source.message),
        _ => RemoteFailure::Other,
    };

    ReportError::RemoteFetch {
        operation,
        kind,
        source: Box::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse_commit(json: &str) -> RemoteCommit {
        let payload: CommitPayload = serde_json::from_str(json).expect("valid commit payload");
        RemoteCommit::from(payload)
    }

    #[test]
    fn test_page_from_next_link_query() {
        assert_eq!(page_from_query(Some("state=closed&per_page=100&page=3"), 2), 3);
        assert_eq!(page_from_query(Some("page=7&per_page=100"), 6), 7);
    }

    #[test]
    fn test_page_falls_back_to_following_page() {
        assert_eq!(page_from_query(Some("per_page=100&since=2024-01-01"), 4), 5);
        assert_eq!(page_from_query(Some("per_page=100&page=abc"), 4), 5);
        assert_eq!(page_from_query(None, 1), 2);
    }

    #[test]
    fn test_root_commit_has_no_first_parent() {
        let commit = parse_commit(
            r#"{
                "sha": "root",
                "parents": [],
                "commit": {
                    "committer": { "date": "2024-05-01T10:00:00Z" },
                    "author": { "date": "2024-04-30T10:00:00Z" }
                }
            }"#,
        );

        assert_eq!(commit.sha, "root");
        assert_eq!(commit.first_parent, None);
        assert_eq!(
            commit.committed_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_merge_commit_uses_first_parent() {
        let commit = parse_commit(
            r#"{
                "sha": "merge",
                "parents": [{ "sha": "mainline" }, { "sha": "feature" }],
                "commit": {
                    "committer": { "date": "2024-05-01T10:00:00Z" },
                    "author": null
                }
            }"#,
        );

        assert_eq!(commit.first_parent.as_deref(), Some("mainline"));
    }

    #[test]
    fn test_commit_date_falls_back_to_author() {
        let commit = parse_commit(
            r#"{
                "sha": "c1",
                "parents": [{ "sha": "c0" }],
                "commit": {
                    "committer": { "date": null },
                    "author": { "date": "2024-04-30T08:30:00Z" }
                }
            }"#,
        );

        assert_eq!(
            commit.committed_at,
            Some(Utc.with_ymd_and_hms(2024, 4, 30, 8, 30, 0).unwrap())
        );
    }
}
