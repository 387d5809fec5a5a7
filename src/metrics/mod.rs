//! Metric derivation
//!
//! Turns the build outcome and the data read from the hosting API into the
//! points and events that get forwarded to the metrics backend. Everything in
//! here is pure: no I/O, no clock reads.
//!
//! Every [`MetricPoint`] carries a [`TagSet`], and a tag set can only be
//! started from a repository, so each point is tagged with `repo:<owner/name>`.

mod build_event;
mod build_outcome;
mod derive;
mod metric_point;

pub use build_event::{BuildEvent, LogEntry, Priority, Severity};
pub use build_outcome::{BuildOutcome, BuildRun};
pub use derive::{
    LATEST_VERSION, PR_LEAD_TIME, VERSION_LEAD_TIME, build_event, build_outcome_point, latest_version_point, log_entry,
    pr_lead_time_points, version_lead_time_point,
};
pub use metric_point::{MetricKind, MetricPoint, TagSet};
