use std::process::ExitCode;

use super::check::cmd_check;
use super::config::cmd_config;
use super::env::CliArgs;
use super::rules::cmd_rules;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<ExitCode> {
    match cli.command.clone() {
        Commands::Check(args) => cmd_check(args, ctx, cli.output.clone()).await,
        Commands::Rules(args) => cmd_rules(args, ctx, cli.output.clone()).await,
        Commands::Config(args) => cmd_config(args, ctx, cli.output.clone()).await,
    }
}
