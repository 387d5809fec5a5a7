use crate::Result;
use crate::error::{ReportError, ReportResult};
use crate::hosting::PullRequestState;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use url::Url;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../default_config.toml");

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "ci-metrics.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL of the source-control hosting API
    #[serde(default = "default_hosting_api_url")]
    pub hosting_api_url: String,

    /// Base URL of the metrics backend API
    #[serde(default = "default_metrics_api_url")]
    pub metrics_api_url: String,

    /// Base URL of the log intake
    #[serde(default = "default_logs_api_url")]
    pub logs_api_url: String,

    /// Upper bound on each outbound request
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Pull-request submissions allowed in flight at once
    #[serde(default = "default_max_concurrent_submissions")]
    pub max_concurrent_submissions: usize,

    /// Which pull requests to list
    #[serde(default)]
    pub pull_request_state: PullRequestState,

    /// Marker tag identifying the CI platform
    #[serde(default = "default_platform_tag")]
    pub platform_tag: String,

    /// Tags attached to everything submitted
    #[serde(default)]
    pub extra_tags: Vec<String>,

    /// Submit a discrete build event
    #[serde(default = "default_true")]
    pub submit_event: bool,

    /// Submit a build log record
    #[serde(default)]
    pub submit_log: bool,
}

fn default_hosting_api_url() -> String {
    "https://api.github.com/".into()
}

fn default_metrics_api_url() -> String {
    "https://api.datadoghq.com/".into()
}

fn default_logs_api_url() -> String {
    "https://http-intake.logs.datadoghq.com/".into()
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

const fn default_max_concurrent_submissions() -> usize {
    4
}

fn default_platform_tag() -> String {
    "github:actions".into()
}

const fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosting_api_url: default_hosting_api_url(),
            metrics_api_url: default_metrics_api_url(),
            logs_api_url: default_logs_api_url(),
            request_timeout: default_request_timeout(),
            max_concurrent_submissions: default_max_concurrent_submissions(),
            pull_request_state: PullRequestState::default(),
            platform_tag: default_platform_tag(),
            extra_tags: Vec::new(),
            submit_event: true,
            submit_log: false,
        }
    }
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `ci-metrics.toml` in `base_dir` is used if present.
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        Self::load_with_source(base_dir, config_path).map(|(config, _)| config)
    }

    /// Like [`Self::load`], also returning the file that was read, if any.
    pub fn load_with_source(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<(Self, Option<Utf8PathBuf>)> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading ci-metrics configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!("No {DEFAULT_CONFIG_FILE} in '{base_dir}', using default configuration");
                    return Ok((Self::default(), None));
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading ci-metrics configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        log::debug!("Loaded configuration from '{final_path}'");
        Ok((config, Some(final_path)))
    }

    /// Save the default configuration to a TOML file
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("hosting_api_url", &self.hosting_api_url),
            ("metrics_api_url", &self.metrics_api_url),
            ("logs_api_url", &self.logs_api_url),
        ] {
            let _ = parse_base_url(field, value).map_err(|e| app_err!("{e}"))?;
        }

        if self.request_timeout.is_zero() {
            return Err(app_err!("request_timeout must be greater than zero"));
        }

        if self.max_concurrent_submissions == 0 {
            return Err(app_err!("max_concurrent_submissions must be at least 1"));
        }

        if !is_tag(&self.platform_tag) {
            return Err(app_err!("platform_tag must be in key:value form, got '{}'", self.platform_tag));
        }

        if let Some(bad) = self.extra_tags.iter().find(|t| !is_tag(t)) {
            return Err(app_err!("extra_tags entries must be in key:value form, got '{bad}'"));
        }

        Ok(())
    }

    pub fn hosting_api_url(&self) -> ReportResult<Url> {
        parse_base_url("hosting_api_url", &self.hosting_api_url)
    }

    pub fn metrics_api_url(&self) -> ReportResult<Url> {
        parse_base_url("metrics_api_url", &self.metrics_api_url)
    }

    pub fn logs_api_url(&self) -> ReportResult<Url> {
        parse_base_url("logs_api_url", &self.logs_api_url)
    }
}

fn is_tag(s: &str) -> bool {
    s.split_once(':').is_some_and(|(key, value)| !key.is_empty() && !value.is_empty())
}

fn parse_base_url(field: &str, value: &str) -> ReportResult<Url> {
    let url = Url::parse(value).map_err(|e| ReportError::InvalidInput(format!("{field} '{value}' is not a valid URL: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ReportError::InvalidInput(format!("{field} '{value}' must use http or https")));
    }

    Ok(url)
}
