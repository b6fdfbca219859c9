use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{init_logging, load_config, LoadedConfig};

pub async fn run() -> Result<ExitCode> {
    let cli = CliArgs::parse();

    init_logging(&cli.log_level, cli.debug)?;

    debug!("Starting pathwarden v{}", env!("CARGO_PKG_VERSION"));

    let LoadedConfig { config, path } = load_config(cli.config.as_ref()).await?;
    let cli_context = CliContext::new(config, path, cli.rules.clone());

    match dispatch(&cli, &cli_context).await {
        Ok(code) => {
            debug!("Command completed");
            Ok(code)
        }
        Err(err) => {
            error!("Command failed: {}", err);
            Err(err)
        }
    }
}
