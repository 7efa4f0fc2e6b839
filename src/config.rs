//! Report configuration and environment variable parsing.
//!
//! This module handles loading configuration settings from the environment (e.g., .env file).
//! It defines the `ReportConfig` struct which governs the repository to report on, the
//! access credential, and the reporting window. Configuration is resolved once at startup
//! and passed by reference everywhere else; there is no ambient global state.

use anyhow::{bail, Context};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fmt;

/// A unique identifier for a GitHub repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoId {
    /// The owner of the repository (e.g., "facebook").
    pub owner: String,
    /// The name of the repository (e.g., "react").
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// How the repository identifier was supplied.
///
/// This also selects the column layout of the CSV report: owner+name input
/// leads each row with the `owner/repo` slug, while combined input leads with
/// the pull request URL and includes the author handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepoInput {
    /// `REPO_OWNER` and `REPO_NAME` as two variables.
    OwnerAndName,
    /// `GITHUB_REPOSITORY` as a single `owner/repo` string.
    Combined,
}

/// Usage text printed for `help`/`-h` and on configuration errors.
pub const USAGE: &str = "\
merge-report: generate a CSV report of pull requests merged within a date window

Environment variables:
  GITHUB_TOKEN        GitHub access token (required)
  REPO_OWNER          repository owner (paired with REPO_NAME)
  REPO_NAME           repository name (paired with REPO_OWNER)
  GITHUB_REPOSITORY   owner/repo, alternative to REPO_OWNER/REPO_NAME
  REPORT_START        start of the reporting window, RFC 3339
                      (default 2023-10-01T00:00:00Z)
  REPORT_END          end of the reporting window, RFC 3339
                      (default 2024-09-30T23:59:59Z)
  BASE_BRANCH         target branch of the pull requests (default: main)
  MAX_API_PAGES       cap on paginated GitHub API requests (default: 100)

Arguments:
  help, -h, --help    print this message and exit

The report is written as a CSV file into the current working directory.";

/// Raw environment shape as envy sees it, validated into [`ReportConfig`].
#[derive(Debug, Deserialize)]
struct RawConfig {
    github_token: Option<String>,
    repo_owner: Option<String>,
    repo_name: Option<String>,
    github_repository: Option<String>,
    report_start: Option<DateTime<Utc>>,
    report_end: Option<DateTime<Utc>>,
    #[serde(default = "default_base_branch")]
    base_branch: String,
    #[serde(default = "default_max_api_pages")]
    max_api_pages: u32,
}

fn default_base_branch() -> String {
    "main".to_string()
}

fn default_max_api_pages() -> u32 {
    100
}

/// Report configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// The repository to report on.
    pub repo: RepoId,

    /// Which environment variables supplied the repository identifier.
    pub input: RepoInput,

    /// GitHub access token used for the authorization header.
    pub github_token: String,

    /// Inclusive start of the reporting window.
    pub start: DateTime<Utc>,

    /// Inclusive end of the reporting window.
    pub end: DateTime<Utc>,

    /// Target branch the reported pull requests were merged into.
    pub base_branch: String,

    /// Hard limit on the number of paginated requests to make to the GitHub API.
    pub max_api_pages: u32,
}

impl ReportConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let raw: RawConfig = envy::from_env().context("invalid environment configuration")?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> anyhow::Result<Self> {
        let Some(github_token) = raw.github_token else {
            bail!("GITHUB_TOKEN is not set");
        };

        // Owner+name takes precedence when both forms are present.
        let (repo, input) = match (raw.repo_owner, raw.repo_name, raw.github_repository) {
            (Some(owner), Some(repo), _) => (RepoId { owner, repo }, RepoInput::OwnerAndName),
            (_, _, Some(combined)) => (parse_combined(&combined)?, RepoInput::Combined),
            _ => bail!("set REPO_OWNER and REPO_NAME, or GITHUB_REPOSITORY as owner/repo"),
        };

        Ok(Self {
            repo,
            input,
            github_token,
            start: raw.report_start.unwrap_or_else(default_start),
            end: raw.report_end.unwrap_or_else(default_end),
            base_branch: raw.base_branch,
            max_api_pages: raw.max_api_pages,
        })
    }
}

fn default_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 10, 1, 0, 0, 0).unwrap()
}

fn default_end() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 30, 23, 59, 59).unwrap()
}

fn parse_combined(s: &str) -> anyhow::Result<RepoId> {
    let parts: Vec<&str> = s.trim().split('/').collect();
    match parts.as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => Ok(RepoId {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }),
        _ => bail!("GITHUB_REPOSITORY must be of the form owner/repo, got '{s}'"),
    }
}
