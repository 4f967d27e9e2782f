//! Ranking of the files most frequently touched by recent commits.

use crate::config::RepoId;
use crate::error::ReportError;
use crate::metrics::{ChangedFileList, FileTally, ObservationWindow};
use crate::pagination::{paginate, PageLimit};
use crate::source::RepoDataSource;
use futures::TryStreamExt;
use std::pin::pin;

/// What to do with a commit that has no parent to diff against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RootCommitPolicy {
    /// Leave the commit out and record its SHA in the result.
    #[default]
    Skip,
    /// Abort with [`ReportError::MalformedCommit`].
    Fail,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RankOptions {
    pub root_commits: RootCommitPolicy,
    pub page_limit: PageLimit,
}

/// Counts, for every path, how many commits in `window` changed it.
///
/// Each commit is compared against its first parent, so this costs one
/// compare call per commit on top of the listing. Any failed call aborts the
/// whole ranking.
pub async fn rank_changed_files<S>(
    source: &S,
    repo: &RepoId,
    window: ObservationWindow,
    options: RankOptions,
) -> Result<ChangedFileList, ReportError>
where
    S: RepoDataSource + ?Sized,
{
    let mut tally = FileTally::new();
    let mut skipped = Vec::new();
    let mut pages = pin!(paginate(
        |page| source.list_commits(repo, window.start, page),
        options.page_limit,
    ));

    while let Some(commits) = pages.try_next().await? {
        for commit in commits {
            if commit.committed_at.is_some_and(|at| !window.contains(at)) {
                tracing::debug!(sha = %commit.sha, "Skipping commit outside the window");
                continue;
            }

            let Some(parent) = commit.first_parent.as_deref() else {
                match options.root_commits {
                    RootCommitPolicy::Skip => {
                        tracing::warn!(repo = %repo, sha = %commit.sha, "Skipping root commit");
                        skipped.push(commit.sha);
                        continue;
                    }
                    RootCommitPolicy::Fail => {
                        return Err(ReportError::MalformedCommit { sha: commit.sha });
                    }
                }
            };

            let diff = source.compare_commits(repo, parent, &commit.sha).await?;
            tally.record_commit(diff.iter().map(|entry| entry.filename.as_str()));
        }
    }

    let ranked = tally.into_ranked(skipped);
    tracing::info!(
        repo = %repo,
        commits = ranked.commits_examined,
        files = ranked.files.len(),
        "Ranked changed files"
    );

    Ok(ranked)
}
