//! Report CI build outcomes and delivery lead times to a metrics backend.
//!
//! `ci-metrics` runs once at the end of a CI job. It reads the latest release,
//! the pull requests, and the release history of a repository from the GitHub
//! API, derives a handful of metric points from them, and submits those points
//! (plus a build event and, optionally, a log record) to Datadog.
//!
//! # Metrics
//!
//! | Metric | Type | Value | Tags |
//! |---|---|---|---|
//! | `build.success` / `build.failure` | count | 1 | `repo`, platform, `build`, `version` |
//! | `pr.lead_time` | gauge | seconds from creation to merge | `repo`, `pr` |
//! | `version.lead_time` | gauge | seconds between the two newest releases | `repo`, `from_version`, `to_version` |
//! | `build.latest_version` | gauge | 1 | `repo`, `version` |
//!
//! # Usage
//!
//! ```bash
//! export DD_API_KEY=... GITHUB_PAT=... GITHUB_REPOSITORY=acme/widgets
//! ci-metrics report --build-status success
//! ```
//!
//! Settings beyond the inputs above live in an optional `ci-metrics.toml`;
//! `ci-metrics init` writes one with every default spelled out.
//!
//! This crate's library API exists to support the `ci-metrics` binary and its
//! tests. It may change without warning.

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod commands;
pub mod config;
pub mod error;
pub mod hosting;
pub mod metrics;
pub mod pipeline;
pub mod sink;

mod http;

pub use crate::commands::{Host, run};
