//! Application configuration and environment variable parsing.
//!
//! This module handles loading configuration settings from the environment (e.g., .env file).
//! It defines the `AppConfig` struct which governs defaults such as the observation windows,
//! the GitHub page size and the page cap. Command-line flags override these values.

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// GitHub never returns more than this many items per page.
pub const MAX_PER_PAGE: u8 = 100;

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// The owner of the repository (e.g., "facebook").
    pub owner: String,
    /// The name of the repository (e.g., "react").
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// GitHub Personal Access Token.
    pub github_token: Option<String>,

    /// Fallback token variable, read when `GITHUB_TOKEN` is unset.
    pub github_api_token: Option<String>,

    /// Number of past days of pull requests to include in the merge metrics.
    #[serde(default = "default_window_days")]
    pub pr_window_days: i64,

    /// Number of past days of commits to include in the changed-file ranking.
    #[serde(default = "default_window_days")]
    pub commit_window_days: i64,

    /// Optional hard limit on the number of paginated requests per listing.
    pub max_github_api_pages: Option<u32>,

    /// Items requested per page.
    #[serde(default = "default_per_page")]
    pub github_per_page: u8,

    /// How many files the report lists.
    #[serde(default = "default_top_files")]
    pub top_files: usize,
}

fn default_window_days() -> i64 {
    180
}

fn default_per_page() -> u8 {
    MAX_PER_PAGE
}

fn default_top_files() -> usize {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            github_api_token: None,
            pr_window_days: default_window_days(),
            commit_window_days: default_window_days(),
            max_github_api_pages: None,
            github_per_page: default_per_page(),
            top_files: default_top_files(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Returns the first non-blank token, preferring `GITHUB_TOKEN`.
    pub fn token(&self) -> Result<&str, ReportError> {
        [&self.github_token, &self.github_api_token]
            .into_iter()
            .flatten()
            .map(|token| token.trim())
            .find(|token| !token.is_empty())
            .ok_or(ReportError::MissingCredential)
    }
}
