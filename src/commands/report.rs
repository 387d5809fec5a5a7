use super::Host;
use super::common::{LogLevel, init_logging};
use crate::Result;
use crate::config::Config;
use crate::error::ReportError;
use crate::pipeline::{Pipeline, RunSummary, prepare_run};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use clap::Parser;
use ohno::{AppError, app_err};
use std::io::Write;

const LOG_TARGET: &str = "    report";

#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// API key for the metrics backend
    #[arg(long, value_name = "KEY", env = "DD_API_KEY", hide_env_values = true)]
    pub dd_api_key: String,

    /// Outcome of the CI run being reported: `success` or `failure`
    #[arg(long, value_name = "STATUS", env = "BUILD_STATUS")]
    pub build_status: String,

    /// Repository in `owner/name` form
    #[arg(long, value_name = "OWNER/NAME", env = "GITHUB_REPOSITORY")]
    pub repository: String,

    /// Personal access token for the hosting API
    #[arg(long, value_name = "TOKEN", env = "GITHUB_PAT", hide_env_values = true)]
    pub github_token: String,

    /// Path to configuration file (default is `ci-metrics.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LogLevel,
}

fn to_app_err(e: ReportError) -> AppError {
    app_err!("{e}")
}

async fn report(args: &ReportArgs) -> Result<RunSummary> {
    let config = Config::load(Utf8Path::new("."), args.config.as_ref())?;

    let run = prepare_run(&args.build_status, &args.repository, Utc::now()).map_err(to_app_err)?;
    let pipeline = Pipeline::new(&config, &args.github_token, &args.dd_api_key).map_err(to_app_err)?;

    pipeline.run(&run).await.map_err(to_app_err)
}

pub async fn process_report<H: Host>(host: &mut H, args: &ReportArgs) -> Result<()> {
    init_logging(args.log_level);

    match report(args).await {
        Ok(summary) => {
            let _ = writeln!(host.output(), "{summary}");
            Ok(())
        }
        Err(e) => {
            log::error!(target: LOG_TARGET, "Build report for '{}' failed: {e}", args.repository);
            let _ = writeln!(host.error(), "❌ Build report failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}
