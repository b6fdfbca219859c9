use clap::Subcommand;

use super::check::CheckArgs;
use super::config::ConfigArgs;
use super::rules::RulesArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Decide whether a request is authorized
    Check(CheckArgs),

    /// Validate and inspect rule files
    Rules(RulesArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),
}
