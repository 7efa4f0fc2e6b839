//! GitHub API client and the paginated fetch loop for merged pull requests.
//!
//! Closed pull requests are listed newest-first by creation time, 100 per
//! page. Each page is filtered down to merged entries before the next page is
//! requested; the loop stops once the accumulated tail falls behind the start
//! of the reporting window, since later pages only reach further into the past.

use crate::config::RepoId;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use octocrab::{Octocrab, Page};
use serde::Deserialize;

const PAGE_SIZE: u8 = 100;

/// The slice of a GitHub pull request payload consumed by the report.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPullRequest {
    pub title: Option<String>,
    pub html_url: Option<String>,
    pub user: Option<ApiUser>,
    pub created_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub login: String,
}

/// A merged pull request, projected to the fields that appear in the report.
///
/// Only merged entries are ever constructed, so `merged_at` is not optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedPullRequest {
    pub title: String,
    pub url: String,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub merged_at: DateTime<Utc>,
}

pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()?;
        Ok(Self { octocrab })
    }

    /// Builds a client against a different API root.
    ///
    /// Used by tests to point the fetch loop at a local mock server.
    pub fn with_base_uri(token: &str, base_uri: &str) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(base_uri)?
            .build()?;
        Ok(Self { octocrab })
    }

    /// Retrieves all merged pull requests targeting `base_branch` back to the
    /// `start` boundary.
    ///
    /// Pages are fetched strictly in sequence because the termination check
    /// depends on the previous page's last retained entry. An empty page is
    /// terminal, and at most `max_pages` requests are made; hitting the cap
    /// logs a warning since the report may then be incomplete.
    pub async fn fetch_merged_pull_requests(
        &self,
        repo: &RepoId,
        base_branch: &str,
        start: DateTime<Utc>,
        max_pages: u32,
    ) -> Result<Vec<MergedPullRequest>> {
        let route = format!("/repos/{}/{}/pulls", repo.owner, repo.repo);
        let mut merged: Vec<MergedPullRequest> = Vec::new();
        let mut hit_page_limit = true;

        for page_num in 1..=max_pages {
            let page = self
                .fetch_page(&route, base_branch, page_num)
                .await
                .with_context(|| {
                    format!("failed to fetch pull requests for {repo} (page {page_num})")
                })?;

            if page.items.is_empty() {
                hit_page_limit = false;
                break;
            }

            merged.extend(page.items.iter().filter_map(slim_pull_request));

            // Pages arrive in descending creation-time order, so once the tail
            // of the accumulated merged PRs is older than the window start, no
            // further page can contain in-range entries.
            if merged.last().is_some_and(|pr| pr.merged_at < start) {
                hit_page_limit = false;
                break;
            }
        }

        if hit_page_limit {
            tracing::warn!(
                "Hit MAX_API_PAGES ({}) for {} before crossing the start boundary. The report may be incomplete.",
                max_pages,
                repo
            );
        }

        Ok(merged)
    }

    async fn fetch_page(
        &self,
        route: &str,
        base_branch: &str,
        page_num: u32,
    ) -> Result<Page<ApiPullRequest>> {
        let page_str = page_num.to_string();
        let per_page_str = PAGE_SIZE.to_string();
        let query = [
            ("state", "closed"),
            ("base", base_branch),
            ("sort", "created"),
            ("direction", "desc"),
            ("per_page", per_page_str.as_str()),
            ("page", page_str.as_str()),
        ];

        self.octocrab
            .get(route, Some(&query))
            .await
            .map_err(describe_octocrab_error)
    }
}

/// Projects an API entry to a report row.
///
/// Unmerged PRs (closed without merging) and entries missing a creation
/// timestamp are dropped.
fn slim_pull_request(pr: &ApiPullRequest) -> Option<MergedPullRequest> {
    let merged_at = pr.merged_at?;
    let created_at = pr.created_at?;

    Some(MergedPullRequest {
        title: pr.title.clone().unwrap_or_default(),
        url: pr.html_url.clone().unwrap_or_default(),
        author: pr.user.as_ref().map(|u| u.login.clone()),
        created_at,
        merged_at,
    })
}

/// Surfaces the HTTP status code and API message text for GitHub error
/// responses; transport and decode failures pass through unchanged.
fn describe_octocrab_error(error: octocrab::Error) -> anyhow::Error {
    match error {
        octocrab::Error::GitHub { source, .. } => anyhow!(
            "GitHub API returned {}: {}",
            source.status_code,
            source.message
        ),
        other => anyhow::Error::new(other),
    }
}
