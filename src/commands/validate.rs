use super::Host;
use crate::Result;
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `ci-metrics.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

fn validate_config_inner<H: Host>(host: &mut H, base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<()> {
    match Config::load_with_source(base_dir, config_path) {
        Ok((_, source)) => {
            let _ = writeln!(host.output(), "Configuration file is valid");
            if let Some(path) = source {
                let _ = writeln!(host.output(), "Config file: {path}");
            } else {
                let _ = writeln!(host.output(), "Using default configuration (no {DEFAULT_CONFIG_FILE} found)");
            }
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Configuration validation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    validate_config_inner(host, Utf8Path::new("."), args.config.as_ref())
}
