use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::json;

use super::context::CliContext;
use super::output::{print_structured, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the configuration in effect
    Show,
    /// Print the configuration file path
    Path,
}

pub async fn cmd_config(
    args: ConfigArgs,
    ctx: &CliContext,
    output: OutputFormat,
) -> Result<ExitCode> {
    let path = ctx.config_path();
    match args.action {
        ConfigAction::Show => {
            let options = ctx.load_options();
            let payload = json!({
                "path": path,
                "config": ctx.config(),
                "effective_rule_paths": options.paths,
            });
            if !print_structured(&output, &payload)? {
                println!("Current configuration ({}):", path.display());
                print!("{}", serde_yaml::to_string(ctx.config())?);
                if options.paths != ctx.config().rule_paths {
                    println!("Rule files from command line:");
                    for path in &options.paths {
                        println!("  {}", path.display());
                    }
                }
            }
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(ExitCode::SUCCESS)
}
