use core::fmt::{Display, Formatter};
use thiserror::Error;

/// The remote system a failed request was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    /// The source-control hosting API (releases, pull requests)
    Hosting,

    /// The metrics backend (series, events, log intake)
    Metrics,
}

impl Display for Upstream {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Hosting => write!(f, "source-control API"),
            Self::Metrics => write!(f, "metrics backend"),
        }
    }
}

/// Failures that can end (or, for [`ReportError::InsufficientHistory`], shorten) a reporting run.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A value supplied by the invoking environment is unusable. Raised before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A request could not be delivered or was refused.
    #[error("{upstream} unavailable while {operation}: {reason}")]
    UpstreamUnavailable {
        upstream: Upstream,
        operation: String,
        reason: String,
    },

    /// A response arrived but its content cannot be used.
    #[error("malformed response from {upstream} while {operation}: {reason}")]
    MalformedResponse {
        upstream: Upstream,
        operation: String,
        reason: String,
    },

    /// Fewer than two releases exist, so no version lead time can be computed.
    #[error("release history has {found} release(s), at least 2 are needed for a version lead time")]
    InsufficientHistory { found: usize },
}

impl ReportError {
    pub(crate) fn unavailable(upstream: Upstream, operation: impl Into<String>, reason: impl Display) -> Self {
        Self::UpstreamUnavailable {
            upstream,
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(upstream: Upstream, operation: impl Into<String>, reason: impl Display) -> Self {
        Self::MalformedResponse {
            upstream,
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the run should stop when this error is returned.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::InsufficientHistory { .. })
    }
}

/// Result type for the reporting pipeline and its clients.
pub type ReportResult<T> = Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_history_is_not_fatal() {
        assert!(!ReportError::InsufficientHistory { found: 1 }.is_fatal());
        assert!(ReportError::InvalidInput("x".into()).is_fatal());
        assert!(ReportError::unavailable(Upstream::Hosting, "fetching", "timeout").is_fatal());
    }

    #[test]
    fn test_display_includes_context() {
        let err = ReportError::unavailable(Upstream::Metrics, "submitting series", "HTTP 403 Forbidden");
        assert_eq!(
            err.to_string(),
            "metrics backend unavailable while submitting series: HTTP 403 Forbidden"
        );

        let err = ReportError::malformed(Upstream::Hosting, "fetching releases", "missing field `tag_name`");
        assert_eq!(
            err.to_string(),
            "malformed response from source-control API while fetching releases: missing field `tag_name`"
        );
    }

    #[test]
    fn test_insufficient_history_message() {
        let err = ReportError::InsufficientHistory { found: 0 };
        assert_eq!(
            err.to_string(),
            "release history has 0 release(s), at least 2 are needed for a version lead time"
        );
    }
}
