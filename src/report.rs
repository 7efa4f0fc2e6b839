//! Report assembly: ordering, range filtering, CSV rendering and file naming.

use crate::config::{RepoId, RepoInput};
use crate::github::MergedPullRequest;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write as _;

/// Sorts descending by merge time, then keeps `start <= merged_at <= end`.
///
/// Sorting happens first only so the emitted rows read newest-first. The
/// filter itself does not depend on order: pagination is by creation time,
/// so merge times within a fetched page are not monotonic.
pub fn sort_and_filter(
    mut prs: Vec<MergedPullRequest>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<MergedPullRequest> {
    prs.sort_by(|a, b| b.merged_at.cmp(&a.merged_at));
    prs.retain(|pr| pr.merged_at >= start && pr.merged_at <= end);
    prs
}

/// Renders the CSV document for the given input mode.
///
/// Titles are wrapped in double quotes; embedded quotes and commas are not
/// escaped (known limitation).
pub fn render_csv(prs: &[MergedPullRequest], repo: &RepoId, input: RepoInput) -> String {
    let mut csv = String::new();

    match input {
        RepoInput::OwnerAndName => {
            csv.push_str("Repo,Title,URL,Created,Merged\n");
            for pr in prs {
                let _ = writeln!(
                    csv,
                    "{},\"{}\",{},{},{}",
                    repo,
                    pr.title,
                    pr.url,
                    format_instant(pr.created_at),
                    format_instant(pr.merged_at)
                );
            }
        }
        RepoInput::Combined => {
            csv.push_str("URL,Title,Author,Created,Merged\n");
            for pr in prs {
                let _ = writeln!(
                    csv,
                    "{},\"{}\",{},{},{}",
                    pr.url,
                    pr.title,
                    pr.author.as_deref().unwrap_or(""),
                    format_instant(pr.created_at),
                    format_instant(pr.merged_at)
                );
            }
        }
    }

    csv
}

/// Output filename embedding the repository name and a human-readable
/// rendering of the window, e.g. `widgets-merged-prs-01-Oct-2023-to-30-Sep-2024.csv`.
pub fn output_filename(repo: &RepoId, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "{}-merged-prs-{}-to-{}.csv",
        repo.repo,
        start.format("%d-%b-%Y"),
        end.format("%d-%b-%Y")
    )
}

/// Fixed, sortable instant rendering (UTC with milliseconds, `Z` suffix).
fn format_instant(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pr(n: u32, merged_at: DateTime<Utc>) -> MergedPullRequest {
        MergedPullRequest {
            title: format!("PR {n}"),
            url: format!("https://github.com/acme/widgets/pull/{n}"),
            author: Some("octocat".to_string()),
            created_at: merged_at - chrono::Duration::days(1),
            merged_at,
        }
    }

    fn repo() -> RepoId {
        RepoId {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
        }
    }

    #[test]
    fn test_sorts_descending_by_merge_time() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        let prs = vec![
            pr(1, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
            pr(2, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
            pr(3, Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()),
        ];

        let sorted = sort_and_filter(prs, start, end);

        let titles: Vec<&str> = sorted.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["PR 2", "PR 3", "PR 1"]);
    }

    #[test]
    fn test_filter_is_inclusive_on_both_ends() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap();
        let prs = vec![
            pr(1, start - chrono::Duration::seconds(1)),
            pr(2, start),
            pr(3, Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()),
            pr(4, end),
            pr(5, end + chrono::Duration::seconds(1)),
        ];

        let kept = sort_and_filter(prs, start, end);

        let titles: Vec<&str> = kept.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["PR 4", "PR 3", "PR 2"]);
    }

    #[test]
    fn test_zero_width_window_keeps_exact_match() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let prs = vec![
            pr(1, instant),
            pr(2, instant + chrono::Duration::seconds(1)),
        ];

        let kept = sort_and_filter(prs, instant, instant);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "PR 1");
    }

    #[test]
    fn test_owner_name_layout() {
        let merged = Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap();
        let csv = render_csv(&[pr(7, merged)], &repo(), RepoInput::OwnerAndName);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Repo,Title,URL,Created,Merged");
        assert_eq!(
            lines[1],
            "acme/widgets,\"PR 7\",https://github.com/acme/widgets/pull/7,\
             2024-02-01T00:00:00.000Z,2024-02-02T00:00:00.000Z"
        );
    }

    #[test]
    fn test_combined_layout_includes_author() {
        let merged = Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap();
        let csv = render_csv(&[pr(7, merged)], &repo(), RepoInput::Combined);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "URL,Title,Author,Created,Merged");
        assert_eq!(
            lines[1],
            "https://github.com/acme/widgets/pull/7,\"PR 7\",octocat,\
             2024-02-01T00:00:00.000Z,2024-02-02T00:00:00.000Z"
        );
    }

    #[test]
    fn test_missing_author_renders_empty_column() {
        let merged = Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap();
        let mut one = pr(7, merged);
        one.author = None;

        let csv = render_csv(&[one], &repo(), RepoInput::Combined);

        assert!(csv.lines().nth(1).unwrap().contains(",\"PR 7\",,"));
    }

    #[test]
    fn test_empty_report_is_header_only() {
        let csv = render_csv(&[], &repo(), RepoInput::OwnerAndName);
        assert_eq!(csv, "Repo,Title,URL,Created,Merged\n");
    }

    #[test]
    fn test_output_filename_embeds_repo_and_window() {
        let start = Utc.with_ymd_and_hms(2023, 10, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 9, 30, 23, 59, 59).unwrap();

        assert_eq!(
            output_filename(&repo(), start, end),
            "widgets-merged-prs-01-Oct-2023-to-30-Sep-2024.csv"
        );
    }
}
