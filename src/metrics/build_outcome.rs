use crate::error::{ReportError, ReportResult};
use crate::hosting::RepoSpec;
use chrono::{DateTime, Utc};
use core::str::FromStr;
use strum::{AsRefStr, Display, EnumString};

/// Result of the CI run that triggered this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum BuildOutcome {
    Success,
    Failure,
}

impl BuildOutcome {
    /// Parse the outcome exactly as the CI environment reports it.
    pub fn parse(s: &str) -> ReportResult<Self> {
        Self::from_str(s).map_err(|_unknown| {
            ReportError::InvalidInput(format!("build outcome must be 'success' or 'failure', got '{s}'"))
        })
    }

    /// Name of the count metric emitted for this outcome.
    #[must_use]
    pub const fn metric_name(self) -> &'static str {
        match self {
            Self::Success => "build.success",
            Self::Failure => "build.failure",
        }
    }
}

/// One invocation of the reporting step.
#[derive(Debug, Clone)]
pub struct BuildRun {
    repo: RepoSpec,
    outcome: BuildOutcome,
    at: DateTime<Utc>,
}

impl BuildRun {
    #[must_use]
    pub const fn new(repo: RepoSpec, outcome: BuildOutcome, at: DateTime<Utc>) -> Self {
        Self { repo, outcome, at }
    }

    #[must_use]
    pub const fn repo(&self) -> &RepoSpec {
        &self.repo
    }

    #[must_use]
    pub const fn outcome(&self) -> BuildOutcome {
        self.outcome
    }

    /// Seconds since the Unix epoch
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.at.timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recognized_outcomes() {
        assert_eq!(BuildOutcome::parse("success").unwrap(), BuildOutcome::Success);
        assert_eq!(BuildOutcome::parse("failure").unwrap(), BuildOutcome::Failure);
    }

    #[test]
    fn test_parse_rejects_other_values() {
        for value in ["cancelled", "skipped", "", "Success", "FAILURE", " success"] {
            let err = BuildOutcome::parse(value).unwrap_err();
            assert!(matches!(err, ReportError::InvalidInput(_)), "{value:?} should be rejected");
        }
    }

    #[test]
    fn test_metric_names() {
        assert_eq!(BuildOutcome::Success.metric_name(), "build.success");
        assert_eq!(BuildOutcome::Failure.metric_name(), "build.failure");
    }

    #[test]
    fn test_display() {
        assert_eq!(BuildOutcome::Success.to_string(), "success");
        assert_eq!(BuildOutcome::Failure.as_ref(), "failure");
    }

    #[test]
    fn test_build_run_timestamp() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let run = BuildRun::new(RepoSpec::parse("acme/widgets").unwrap(), BuildOutcome::Success, at);
        assert_eq!(run.timestamp(), 1_700_000_000);
        assert_eq!(run.repo().to_string(), "acme/widgets");
        assert_eq!(run.outcome(), BuildOutcome::Success);
    }
}
