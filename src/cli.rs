//! Command-line flags and their validation into a report request.

use crate::changed_files::RootCommitPolicy;
use crate::config::{AppConfig, RepoId, MAX_PER_PAGE};
use crate::error::ReportError;
use crate::pagination::PageLimit;
use crate::querier::ReportRequest;
use chrono::{Duration, Utc};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "gh-inspect",
    version,
    about = "Pull request merge latency and file churn for a GitHub repository"
)]
pub struct Cli {
    /// Repository owner
    #[arg(short, long)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Base branch the pull requests merge into
    #[arg(short, long, default_value = "main")]
    pub base: String,

    /// Days of closed pull requests to aggregate (default: PR_WINDOW_DAYS or 180)
    #[arg(long)]
    pub pr_window_days: Option<i64>,

    /// Days of commits to rank files over (default: COMMIT_WINDOW_DAYS or 180)
    #[arg(long)]
    pub commit_window_days: Option<i64>,

    /// Number of changed files to list (default: TOP_FILES or 10)
    #[arg(long)]
    pub top: Option<usize>,

    /// Items per API page, 1 to 100 (default: GITHUB_PER_PAGE or 100)
    #[arg(long)]
    pub per_page: Option<u8>,

    /// Stop each listing after this many pages (default: MAX_GITHUB_API_PAGES or unlimited)
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Abort instead of skipping commits that have no parent
    #[arg(long)]
    pub fail_on_root_commit: bool,

    /// Fetch pull requests and commits at the same time
    #[arg(long)]
    pub concurrent: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Validates the flags and merges them over the env configuration.
    pub fn into_request(self, config: &AppConfig) -> Result<ReportRequest, ReportError> {
        let owner = required("owner", self.owner)?;
        let repo = required("repo", self.repo)?;
        let base = required("base", Some(self.base))?;

        let pr_window = window(
            "pr-window-days",
            self.pr_window_days.unwrap_or(config.pr_window_days),
        )?;
        let commit_window = window(
            "commit-window-days",
            self.commit_window_days.unwrap_or(config.commit_window_days),
        )?;

        let mut request = ReportRequest::new(RepoId::new(owner, repo), base, pr_window, commit_window);

        request.top = self.top.unwrap_or(config.top_files);
        if request.top == 0 {
            return Err(ReportError::invalid("top", "must be at least 1"));
        }

        request.per_page = self.per_page.unwrap_or(config.github_per_page);
        if !(1..=MAX_PER_PAGE).contains(&request.per_page) {
            return Err(ReportError::invalid(
                "per-page",
                format!("must be between 1 and {MAX_PER_PAGE}"),
            ));
        }

        if let Some(max_pages) = self.max_pages.or(config.max_github_api_pages) {
            if max_pages == 0 {
                return Err(ReportError::invalid("max-pages", "must be at least 1"));
            }
            request.page_limit = PageLimit::at_most(max_pages);
        }

        if self.fail_on_root_commit {
            request.root_commits = RootCommitPolicy::Fail;
        }
        request.concurrent = self.concurrent;

        Ok(request)
    }
}

fn required(name: &'static str, value: Option<String>) -> Result<String, ReportError> {
    let value = value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ReportError::MissingParameter(name))?;

    if name != "base" && (value.contains('/') || value.contains("..")) {
        return Err(ReportError::invalid(name, format!("'{value}' is not a valid name")));
    }

    Ok(value)
}

fn window(name: &'static str, days: i64) -> Result<Duration, ReportError> {
    if days <= 0 {
        return Err(ReportError::invalid(name, "must be a positive number of days"));
    }
    Duration::try_days(days)
        .filter(|length| Utc::now().checked_sub_signed(*length).is_some())
        .ok_or_else(|| ReportError::invalid(name, "out of range"))
}
