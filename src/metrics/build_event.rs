use super::TagSet;
use strum::{AsRefStr, Display};

/// Alert level attached to a build event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    Normal,
}

/// A discrete, human-readable record of the build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEvent {
    pub title: String,
    pub text: String,
    pub priority: Priority,
    pub severity: Severity,
    pub tags: TagSet,
}

/// The same build run, shaped for a log intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub source: &'static str,
    pub hostname: &'static str,
    pub service: String,
    pub title: String,
    pub message: String,
    pub status: Severity,
    pub tags: TagSet,
}
