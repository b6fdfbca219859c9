use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use pathwarden_rule_center::RuleCenter;
use serde::Serialize;
use tracing::debug;

use super::context::CliContext;
use super::output::{print_structured, OutputFormat};

/// Exit status for a denied request, distinct from usage (2) and load errors (1).
pub const DENIED_EXIT_CODE: u8 = 3;

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    /// Authenticated user name
    #[arg(short, long)]
    pub user: String,

    /// Role held by the user; repeat to pass several, checked in order
    #[arg(long = "role", value_name = "ROLE")]
    pub roles: Vec<String>,

    /// HTTP method, compared case-sensitively
    #[arg(short, long, default_value = "GET")]
    pub method: String,

    /// Request path
    pub path: String,
}

#[derive(Debug, Serialize)]
struct CheckOutcome<'a> {
    allowed: bool,
    user: &'a str,
    roles: &'a [String],
    method: &'a str,
    path: &'a str,
    rev: u64,
}

pub async fn cmd_check(
    args: CheckArgs,
    ctx: &CliContext,
    output: OutputFormat,
) -> Result<ExitCode> {
    let center = ctx.rule_center().await?;
    let guard = center.guard();
    let allowed = guard.is_authorized(&args.user, args.roles.as_slice(), &args.path, &args.method);
    debug!(rev = guard.revision(), allowed, "checked request");

    let outcome = CheckOutcome {
        allowed,
        user: &args.user,
        roles: &args.roles,
        method: &args.method,
        path: &args.path,
        rev: guard.revision(),
    };
    if !print_structured(&output, &outcome)? {
        println!(
            "{} {} {} (user={:?} roles=[{}] rev={})",
            if allowed { "ALLOW" } else { "DENY" },
            outcome.method,
            outcome.path,
            outcome.user,
            outcome.roles.join(","),
            outcome.rev
        );
    }

    Ok(if allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(DENIED_EXIT_CODE)
    })
}
