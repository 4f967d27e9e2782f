pub mod changed_files;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod merge_time;
pub mod metrics;
pub mod pagination;
pub mod querier;
pub mod report;
pub mod source;

use cli::Cli;
use config::AppConfig;
use github::GitHubSource;
use querier::MetricsQuerier;
use report::RepoReport;

/// Validates the invocation, then builds the report for the requested repository.
///
/// Missing parameters and credentials are reported before any request is sent.
pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<RepoReport> {
    let request = cli.into_request(config)?;
    let token = config.token()?;

    let source = GitHubSource::new(token, request.per_page)?;
    let querier = MetricsQuerier::new(source);

    tracing::debug!(repo = %request.repo, "Starting report");
    let report = querier.report(&request, chrono::Utc::now()).await?;

    Ok(report)
}
