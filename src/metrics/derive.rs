//! Pure functions turning fetched repository data into metric points and events.

use super::{BuildEvent, BuildOutcome, BuildRun, LogEntry, MetricKind, MetricPoint, Priority, Severity, TagSet};
use crate::error::{ReportError, ReportResult, Upstream};
use crate::hosting::{PullRequest, Release};
use chrono::{DateTime, Utc};

pub const PR_LEAD_TIME: &str = "pr.lead_time";
pub const VERSION_LEAD_TIME: &str = "version.lead_time";
pub const LATEST_VERSION: &str = "build.latest_version";

const LOG_SOURCE: &str = "github-actions";
const LOG_HOSTNAME: &str = "github.com";

/// Seconds from `start` to `end`, or `None` when `end` precedes `start`.
fn lead_time_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<u64> {
    u64::try_from((end - start).num_seconds()).ok()
}

#[expect(clippy::cast_precision_loss, reason = "lead times are far below 2^52 seconds")]
fn seconds_value(seconds: u64) -> f64 {
    seconds as f64
}

/// The single count point recording this run's outcome.
#[must_use]
pub fn build_outcome_point(run: &BuildRun, version: &str, platform_tag: &str, extra_tags: &[String]) -> MetricPoint {
    let outcome = run.outcome();

    MetricPoint {
        name: outcome.metric_name(),
        kind: MetricKind::Count,
        value: 1.0,
        timestamp: run.timestamp(),
        tags: TagSet::for_repo(run.repo())
            .with_tag(platform_tag)
            .with("build", outcome)
            .with("version", version)
            .with_tags(extra_tags.iter().cloned()),
    }
}

/// One gauge per merged pull request, valued at merge time minus creation time.
///
/// Unmerged pull requests are skipped. A pull request merged before it was
/// created is a data error.
pub fn pr_lead_time_points(run: &BuildRun, pulls: &[PullRequest], extra_tags: &[String]) -> ReportResult<Vec<MetricPoint>> {
    pulls
        .iter()
        .filter_map(|pr| pr.merged_at.map(|merged_at| (pr, merged_at)))
        .map(|(pr, merged_at)| {
            let seconds = lead_time_seconds(pr.created_at, merged_at).ok_or_else(|| {
                ReportError::malformed(
                    Upstream::Hosting,
                    format!("computing lead time of pull request #{}", pr.number),
                    format!("merged at {merged_at} before it was created at {}", pr.created_at),
                )
            })?;

            Ok(MetricPoint {
                name: PR_LEAD_TIME,
                kind: MetricKind::Gauge,
                value: seconds_value(seconds),
                timestamp: run.timestamp(),
                tags: TagSet::for_repo(run.repo())
                    .with("pr", pr.number)
                    .with_tags(extra_tags.iter().cloned()),
            })
        })
        .collect()
}

/// Gauge of the time between the two newest releases.
///
/// `releases` must be newest first. Fewer than two entries yields
/// [`ReportError::InsufficientHistory`].
pub fn version_lead_time_point(run: &BuildRun, releases: &[Release], extra_tags: &[String]) -> ReportResult<MetricPoint> {
    let [latest, previous, ..] = releases else {
        return Err(ReportError::InsufficientHistory { found: releases.len() });
    };

    let seconds = lead_time_seconds(previous.created_at, latest.created_at).ok_or_else(|| {
        ReportError::malformed(
            Upstream::Hosting,
            format!("computing lead time from {} to {}", previous.tag_name, latest.tag_name),
            format!(
                "release history is not newest first ({} created at {}, {} created at {})",
                latest.tag_name, latest.created_at, previous.tag_name, previous.created_at
            ),
        )
    })?;

    Ok(MetricPoint {
        name: VERSION_LEAD_TIME,
        kind: MetricKind::Gauge,
        value: seconds_value(seconds),
        timestamp: run.timestamp(),
        tags: TagSet::for_repo(run.repo())
            .with("from_version", &previous.tag_name)
            .with("to_version", &latest.tag_name)
            .with_tags(extra_tags.iter().cloned()),
    })
}

/// Constant gauge carrying the resolved version as a tag.
#[must_use]
pub fn latest_version_point(run: &BuildRun, version: &str, extra_tags: &[String]) -> MetricPoint {
    MetricPoint {
        name: LATEST_VERSION,
        kind: MetricKind::Gauge,
        value: 1.0,
        timestamp: run.timestamp(),
        tags: TagSet::for_repo(run.repo())
            .with("version", version)
            .with_tags(extra_tags.iter().cloned()),
    }
}

#[must_use]
pub fn build_event(run: &BuildRun, version: &str, extra_tags: &[String]) -> BuildEvent {
    let repo = run.repo();
    let outcome = run.outcome();

    let (title, text, severity) = match outcome {
        BuildOutcome::Success => (
            format!("New version deployed: {repo}"),
            format!("Version {version} of the service {repo} was successfully deployed."),
            Severity::Info,
        ),
        BuildOutcome::Failure => (
            format!("Build failure: {repo}"),
            format!("Build of the service {repo} failed."),
            Severity::Error,
        ),
    };

    BuildEvent {
        title,
        text,
        priority: Priority::Normal,
        severity,
        tags: TagSet::for_repo(repo)
            .with("build", outcome)
            .with("version", version)
            .with_tags(extra_tags.iter().cloned()),
    }
}

/// Log intake record mirroring `event`.
///
/// Tags follow the event's built-in tags plus `alert_type`, then `extra_tags`.
#[must_use]
pub fn log_entry(run: &BuildRun, version: &str, event: &BuildEvent, extra_tags: &[String]) -> LogEntry {
    LogEntry {
        source: LOG_SOURCE,
        hostname: LOG_HOSTNAME,
        service: run.repo().to_string(),
        title: event.title.clone(),
        message: event.text.clone(),
        status: event.severity,
        tags: TagSet::for_repo(run.repo())
            .with("build", run.outcome())
            .with("version", version)
            .with("alert_type", event.severity)
            .with_tags(extra_tags.iter().cloned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosting::RepoSpec;
    use chrono::Duration;

    const NOW: i64 = 1_700_000_000;

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).unwrap()
    }

    fn run(outcome: BuildOutcome) -> BuildRun {
        BuildRun::new(RepoSpec::parse("acme/widgets").unwrap(), outcome, at(NOW))
    }

    fn release(tag: &str, created: i64) -> Release {
        Release {
            tag_name: tag.to_string(),
            created_at: at(created),
        }
    }

    fn pull(number: u64, created: i64, merged: Option<i64>) -> PullRequest {
        PullRequest {
            number,
            created_at: at(created),
            merged_at: merged.map(at),
        }
    }

    #[test]
    fn test_build_outcome_point_success() {
        let point = build_outcome_point(&run(BuildOutcome::Success), "v2.3.0", "github:actions", &[]);

        assert_eq!(point.name, "build.success");
        assert_eq!(point.kind, MetricKind::Count);
        assert!((point.value - 1.0).abs() < f64::EPSILON);
        assert_eq!(point.timestamp, NOW);
        assert_eq!(
            point.tags.as_slice(),
            ["repo:acme/widgets", "github:actions", "build:success", "version:v2.3.0"]
        );
    }

    #[test]
    fn test_build_outcome_point_failure_with_extra_tags() {
        let extra = vec!["team:platform".to_string()];
        let point = build_outcome_point(&run(BuildOutcome::Failure), "unknown", "gitlab:ci", &extra);

        assert_eq!(point.name, "build.failure");
        assert_eq!(
            point.tags.as_slice(),
            ["repo:acme/widgets", "gitlab:ci", "build:failure", "version:unknown", "team:platform"]
        );
    }

    #[test]
    fn test_pr_lead_time_for_merged_pull_request() {
        let created = NOW - 10 * 86_400;
        let pulls = [pull(17, created, Some(created + 2 * 86_400))];

        let points = pr_lead_time_points(&run(BuildOutcome::Success), &pulls, &[]).unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, PR_LEAD_TIME);
        assert_eq!(points[0].kind, MetricKind::Gauge);
        assert!((points[0].value - 172_800.0).abs() < f64::EPSILON);
        assert_eq!(points[0].tags.as_slice(), ["repo:acme/widgets", "pr:17"]);
    }

    #[test]
    fn test_pr_lead_time_skips_unmerged() {
        let pulls = [pull(1, NOW - 100, None), pull(2, NOW - 100, Some(NOW - 40)), pull(3, NOW - 5, None)];

        let points = pr_lead_time_points(&run(BuildOutcome::Success), &pulls, &[]).unwrap();

        assert_eq!(points.len(), 1);
        assert!(points[0].tags.contains("pr:2"));
        assert!((points[0].value - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pr_lead_time_zero_is_allowed() {
        let pulls = [pull(5, NOW, Some(NOW))];
        let points = pr_lead_time_points(&run(BuildOutcome::Success), &pulls, &[]).unwrap();
        assert!(points[0].value.abs() < f64::EPSILON);
    }

    #[test]
    fn test_pr_lead_time_negative_is_data_error() {
        let pulls = [pull(9, NOW, Some(NOW - 1))];
        let err = pr_lead_time_points(&run(BuildOutcome::Success), &pulls, &[]).unwrap_err();
        assert!(matches!(err, ReportError::MalformedResponse { .. }));
        assert!(err.to_string().contains("#9"));
    }

    #[test]
    fn test_pr_lead_time_empty_list() {
        let points = pr_lead_time_points(&run(BuildOutcome::Failure), &[], &[]).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_version_lead_time() {
        let releases = [release("v2.3.0", NOW - 60), release("v2.2.0", NOW - 3660), release("v2.1.0", NOW - 90_000)];

        let point = version_lead_time_point(&run(BuildOutcome::Success), &releases, &[]).unwrap();

        assert_eq!(point.name, VERSION_LEAD_TIME);
        assert_eq!(point.kind, MetricKind::Gauge);
        assert!((point.value - 3600.0).abs() < f64::EPSILON);
        assert_eq!(
            point.tags.as_slice(),
            ["repo:acme/widgets", "from_version:v2.2.0", "to_version:v2.3.0"]
        );
    }

    #[test]
    fn test_version_lead_time_insufficient_history() {
        for releases in [vec![], vec![release("v1.0.0", NOW)]] {
            let err = version_lead_time_point(&run(BuildOutcome::Success), &releases, &[]).unwrap_err();
            assert!(matches!(err, ReportError::InsufficientHistory { found } if found == releases.len()));
            assert!(!err.is_fatal());
        }
    }

    #[test]
    fn test_version_lead_time_misordered_history_is_data_error() {
        let releases = [release("v1.0.0", NOW - 3600), release("v1.1.0", NOW)];
        let err = version_lead_time_point(&run(BuildOutcome::Success), &releases, &[]).unwrap_err();
        assert!(matches!(err, ReportError::MalformedResponse { .. }));
    }

    #[test]
    fn test_latest_version_point_is_constant() {
        let point = latest_version_point(&run(BuildOutcome::Success), "v2.3.0", &[]);

        assert_eq!(point.name, LATEST_VERSION);
        assert_eq!(point.kind, MetricKind::Gauge);
        assert!((point.value - 1.0).abs() < f64::EPSILON);
        assert_eq!(point.tags.as_slice(), ["repo:acme/widgets", "version:v2.3.0"]);
    }

    #[test]
    fn test_build_event_success() {
        let event = build_event(&run(BuildOutcome::Success), "v2.3.0", &[]);

        insta::assert_snapshot!(event.title, @"New version deployed: acme/widgets");
        insta::assert_snapshot!(event.text, @"Version v2.3.0 of the service acme/widgets was successfully deployed.");
        assert_eq!(event.severity, Severity::Info);
        assert_eq!(event.priority, Priority::Normal);
        assert_eq!(event.tags.as_slice(), ["repo:acme/widgets", "build:success", "version:v2.3.0"]);
    }

    #[test]
    fn test_build_event_failure() {
        let event = build_event(&run(BuildOutcome::Failure), "unknown", &[]);

        insta::assert_snapshot!(event.title, @"Build failure: acme/widgets");
        insta::assert_snapshot!(event.text, @"Build of the service acme/widgets failed.");
        assert_eq!(event.severity, Severity::Error);
    }

    #[test]
    fn test_log_entry_mirrors_event() {
        let run = run(BuildOutcome::Failure);
        let event = build_event(&run, "v1.0.0", &[]);
        let entry = log_entry(&run, "v1.0.0", &event, &[]);

        assert_eq!(entry.source, "github-actions");
        assert_eq!(entry.hostname, "github.com");
        assert_eq!(entry.service, "acme/widgets");
        assert_eq!(entry.title, event.title);
        assert_eq!(entry.message, event.text);
        assert_eq!(entry.status, Severity::Error);
        assert_eq!(
            entry.tags.as_slice(),
            ["repo:acme/widgets", "build:failure", "version:v1.0.0", "alert_type:error"]
        );
    }

    #[test]
    fn test_log_entry_extra_tags_follow_built_in_tags() {
        let run = run(BuildOutcome::Success);
        let extra = vec!["team:platform".to_string(), "env:ci".to_string()];
        let event = build_event(&run, "v2.3.0", &extra);
        let entry = log_entry(&run, "v2.3.0", &event, &extra);

        assert_eq!(
            entry.tags.as_slice(),
            [
                "repo:acme/widgets",
                "build:success",
                "version:v2.3.0",
                "alert_type:info",
                "team:platform",
                "env:ci"
            ]
        );
    }

    #[test]
    fn test_lead_time_seconds() {
        let start = at(NOW);
        assert_eq!(lead_time_seconds(start, start + Duration::hours(1)), Some(3600));
        assert_eq!(lead_time_seconds(start, start), Some(0));
        assert_eq!(lead_time_seconds(start, start - Duration::seconds(1)), None);
    }
}
