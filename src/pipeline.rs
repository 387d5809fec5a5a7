//! One reporting pass: read from the hosting API, derive, submit.
//!
//! Steps run strictly in order and the first fatal error ends the pass.
//! Whatever was submitted before the failure stays submitted.

use crate::config::Config;
use crate::error::ReportResult;
use crate::hosting::{self, PullRequestState, RepoSpec};
use crate::metrics::{
    BuildOutcome, BuildRun, build_event, build_outcome_point, latest_version_point, log_entry, pr_lead_time_points,
    version_lead_time_point,
};
use crate::sink::{SinkClient, SinkEndpoints};
use chrono::{DateTime, Utc};
use core::fmt::{self, Display, Formatter};

const LOG_TARGET: &str = "  pipeline";

/// Validate the raw build inputs.
///
/// The outcome is checked before the repository, and both before anything
/// touches the network.
pub fn prepare_run(build_status: &str, repository: &str, at: DateTime<Utc>) -> ReportResult<BuildRun> {
    let outcome = BuildOutcome::parse(build_status)?;
    let repo = RepoSpec::parse(repository)?;
    Ok(BuildRun::new(repo, outcome, at))
}

/// The parts of [`Config`] that shape a reporting pass.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub pull_request_state: PullRequestState,
    pub platform_tag: String,
    pub extra_tags: Vec<String>,
    pub max_concurrent_submissions: usize,
    pub submit_event: bool,
    pub submit_log: bool,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            pull_request_state: config.pull_request_state,
            platform_tag: config.platform_tag.clone(),
            extra_tags: config.extra_tags.clone(),
            max_concurrent_submissions: config.max_concurrent_submissions,
            submit_event: config.submit_event,
            submit_log: config.submit_log,
        }
    }
}

/// What happened to the version lead time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionStep {
    Submitted,
    Skipped { releases: usize },
}

/// Outcome of a successful reporting pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub repository: String,
    pub outcome: BuildOutcome,
    pub version: String,
    pub points_submitted: usize,
    pub events_submitted: usize,
    pub logs_submitted: usize,
    pub version_step: VersionStep,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reported build {} of {} at version {}", self.outcome, self.repository, self.version)?;
        writeln!(f, "  metric points submitted: {}", self.points_submitted)?;
        writeln!(f, "  events submitted:        {}", self.events_submitted)?;
        writeln!(f, "  log records submitted:   {}", self.logs_submitted)?;
        match self.version_step {
            VersionStep::Submitted => write!(f, "  version lead time:       submitted"),
            VersionStep::Skipped { releases } => {
                write!(f, "  version lead time:       skipped ({releases} release(s) found, 2 needed)")
            }
        }
    }
}

#[derive(Debug)]
pub struct Pipeline {
    hosting: hosting::Client,
    sink: SinkClient,
    settings: PipelineSettings,
}

impl Pipeline {
    /// Build both API clients from `config` and the two credentials.
    pub fn new(config: &Config, github_token: &str, api_key: &str) -> ReportResult<Self> {
        let hosting = hosting::Client::new(github_token, config.hosting_api_url()?, config.request_timeout)?;

        let endpoints = SinkEndpoints::new(&config.metrics_api_url()?, &config.logs_api_url()?)?;
        let sink = SinkClient::new(api_key, endpoints, config.request_timeout)?;

        Ok(Self {
            hosting,
            sink,
            settings: PipelineSettings::from(config),
        })
    }

    #[must_use]
    pub const fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub async fn run(&self, run: &BuildRun) -> ReportResult<RunSummary> {
        let repo = run.repo();
        let extra_tags = &self.settings.extra_tags;

        log::info!(target: LOG_TARGET, "Reporting build {} of '{repo}'", run.outcome());

        let version = self.hosting.fetch_latest_release(repo).await?;

        let outcome_point = build_outcome_point(run, &version, &self.settings.platform_tag, extra_tags);
        self.sink.submit_series(core::slice::from_ref(&outcome_point)).await?;
        let mut points_submitted = 1;

        let pulls = self.hosting.fetch_pull_requests(repo, self.settings.pull_request_state).await?;
        let pr_points = pr_lead_time_points(run, &pulls, extra_tags)?;
        if pr_points.is_empty() {
            log::info!(target: LOG_TARGET, "No merged pull requests among {} fetched", pulls.len());
        } else {
            points_submitted += self
                .sink
                .submit_series_each(&pr_points, self.settings.max_concurrent_submissions)
                .await?;
        }

        let releases = self.hosting.fetch_release_history(repo).await?;
        let version_step = match version_lead_time_point(run, &releases, extra_tags) {
            Ok(lead_time) => {
                let points = [lead_time, latest_version_point(run, &version, extra_tags)];
                self.sink.submit_series(&points).await?;
                points_submitted += points.len();
                VersionStep::Submitted
            }
            Err(e) if !e.is_fatal() => {
                log::warn!(target: LOG_TARGET, "Skipping version lead time for '{repo}': {e}");
                VersionStep::Skipped { releases: releases.len() }
            }
            Err(e) => return Err(e),
        };

        let event = build_event(run, &version, extra_tags);

        let mut events_submitted = 0;
        if self.settings.submit_event {
            self.sink.submit_event(&event).await?;
            events_submitted += 1;
        }

        let mut logs_submitted = 0;
        if self.settings.submit_log {
            self.sink.submit_log(&log_entry(run, &version, &event, extra_tags)).await?;
            logs_submitted += 1;
        }

        Ok(RunSummary {
            repository: repo.to_string(),
            outcome: run.outcome(),
            version,
            points_submitted,
            events_submitted,
            logs_submitted,
            version_step,
        })
    }
}
