#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use gh_inspect::config::RepoId;
use gh_inspect::error::ReportError;
use gh_inspect::pagination::Page;
use gh_inspect::source::{
    DiffEntry, PullRequestQuery, RemoteCommit, RemotePullRequest, RepoDataSource,
};
use std::collections::HashMap;
use std::sync::Mutex;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub fn repo() -> RepoId {
    RepoId::new("octo", "widgets")
}

pub fn commit(sha: &str, parent: Option<&str>, days: i64) -> RemoteCommit {
    RemoteCommit {
        sha: sha.to_string(),
        first_parent: parent.map(str::to_string),
        committed_at: Some(days_ago(days)),
    }
}

pub fn pr(number: u64, created_days_ago: i64, merged_after: Option<Duration>) -> RemotePullRequest {
    let created_at = days_ago(created_days_ago);
    RemotePullRequest {
        number,
        created_at,
        merged_at: merged_after.map(|latency| created_at + latency),
    }
}

#[derive(Default)]
pub struct Calls {
    pub commit_pages: Vec<u32>,
    pub compares: Vec<(String, String)>,
    pub pr_pages: Vec<u32>,
    pub pr_queries: Vec<PullRequestQuery>,
}

/// In-memory data source serving canned pages.
///
/// Page `n` of a listing is `pages[n - 1]`; the last page reports next page 0.
#[derive(Default)]
pub struct FakeSource {
    pub commit_pages: Vec<Vec<RemoteCommit>>,
    pub diffs: HashMap<String, Vec<String>>,
    pub pr_pages: Vec<Vec<RemotePullRequest>>,
    pub failing_compare: Option<String>,
    pub failing_pr_page: Option<u32>,
    pub calls: Mutex<Calls>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_commits(mut self, pages: Vec<Vec<RemoteCommit>>) -> Self {
        self.commit_pages = pages;
        self
    }

    pub fn with_diff(mut self, head_sha: &str, files: &[&str]) -> Self {
        self.diffs.insert(
            head_sha.to_string(),
            files.iter().map(|file| file.to_string()).collect(),
        );
        self
    }

    pub fn with_pull_requests(mut self, pages: Vec<Vec<RemotePullRequest>>) -> Self {
        self.pr_pages = pages;
        self
    }

    fn page_of<T: Clone>(pages: &[Vec<T>], page: u32) -> Page<T> {
        let index = page as usize - 1;
        let items = pages.get(index).cloned().unwrap_or_default();
        let next = if index + 1 < pages.len() { page + 1 } else { 0 };
        Page::with_next_sentinel(items, next)
    }
}

#[async_trait]
impl RepoDataSource for FakeSource {
    async fn list_commits(
        &self,
        _repo: &RepoId,
        _since: DateTime<Utc>,
        page: u32,
    ) -> Result<Page<RemoteCommit>, ReportError> {
        self.calls.lock().unwrap().commit_pages.push(page);
        Ok(Self::page_of(&self.commit_pages, page))
    }

    async fn compare_commits(
        &self,
        _repo: &RepoId,
        base_sha: &str,
        head_sha: &str,
    ) -> Result<Vec<DiffEntry>, ReportError> {
        self.calls
            .lock()
            .unwrap()
            .compares
            .push((base_sha.to_string(), head_sha.to_string()));

        if self.failing_compare.as_deref() == Some(head_sha) {
            return Err(ReportError::remote("compare commits", "Not Found"));
        }

        Ok(self
            .diffs
            .get(head_sha)
            .into_iter()
            .flatten()
            .map(DiffEntry::new)
            .collect())
    }

    async fn list_pull_requests(
        &self,
        _repo: &RepoId,
        query: &PullRequestQuery,
        page: u32,
    ) -> Result<Page<RemotePullRequest>, ReportError> {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.pr_pages.push(page);
            calls.pr_queries.push(query.clone());
        }

        if self.failing_pr_page == Some(page) {
            return Err(ReportError::remote(
                "list pull requests",
                "API rate limit exceeded",
            ));
        }

        Ok(Self::page_of(&self.pr_pages, page))
    }
}
