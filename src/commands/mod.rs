//! Command-line interface for ci-metrics
//!
//! Three subcommands:
//!
//! - **report**: validate the build inputs, read release and pull-request data
//!   from the hosting API, and submit the derived metrics, event, and log
//!   record to the metrics backend
//! - **init**: write the default configuration file
//! - **validate**: load a configuration file and check its values
//!
//! All output goes through a [`Host`] so the commands can be driven from tests
//! without touching the real stdout, stderr, or process exit.

mod common;
mod host;
mod init;
mod report;
mod run;
mod validate;

pub use common::LogLevel;
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use report::{ReportArgs, process_report};
pub use run::run;
pub use validate::{ValidateArgs, validate_config};
