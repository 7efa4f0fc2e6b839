//! Generates CSV reports of merged pull requests for audit purposes.
//!
//! The pipeline is linear: resolve configuration, page through closed pull
//! requests until the reporting window is covered, sort and filter in memory,
//! render CSV, write one file.

pub mod config;
pub mod github;
pub mod report;

use anyhow::Context;
use config::ReportConfig;
use github::GitHubClient;
use std::path::{Path, PathBuf};

/// Runs the full report pipeline with a caller-supplied client.
///
/// Split out from [`generate_report`] so tests can inject a client pointed at
/// a mock API server.
pub async fn generate_report_with_client(
    client: &GitHubClient,
    config: &ReportConfig,
    out_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let fetched = client
        .fetch_merged_pull_requests(
            &config.repo,
            &config.base_branch,
            config.start,
            config.max_api_pages,
        )
        .await?;
    tracing::debug!("Fetched {} merged pull requests for {}", fetched.len(), config.repo);

    let rows = report::sort_and_filter(fetched, config.start, config.end);
    let csv = report::render_csv(&rows, &config.repo, config.input);

    let path = out_dir.join(report::output_filename(&config.repo, config.start, config.end));
    std::fs::write(&path, csv)
        .with_context(|| format!("failed to write report to {}", path.display()))?;

    tracing::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(path)
}

/// Fetches, filters and writes the report into `out_dir`, returning the path
/// of the written file. Any existing file of the same name is overwritten.
pub async fn generate_report(config: &ReportConfig, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let client = GitHubClient::new(&config.github_token)?;
    generate_report_with_client(&client, config, out_dir).await
}
