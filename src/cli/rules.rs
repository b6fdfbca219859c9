use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use pathwarden_rule_center::{load_rule_set_with_options, LoadOptions, RuleCenter};
use serde::Serialize;

use super::context::CliContext;
use super::output::{print_structured, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum RulesCommand {
    /// Compile each rule file on its own and report problems
    Validate(RulesValidateArgs),
    /// Print the compiled rule index
    Show,
}

#[derive(Args, Clone, Debug)]
pub struct RulesValidateArgs {
    /// Rule files to validate
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
struct FileReport {
    file: PathBuf,
    ok: bool,
    rules: usize,
    scopes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn cmd_rules(
    args: RulesArgs,
    ctx: &CliContext,
    output: OutputFormat,
) -> Result<ExitCode> {
    match args.command {
        RulesCommand::Validate(validate_args) => validate(validate_args, output),
        RulesCommand::Show => show(ctx, output).await,
    }
}

fn validate(args: RulesValidateArgs, output: OutputFormat) -> Result<ExitCode> {
    let reports: Vec<FileReport> = args.files.into_iter().map(validate_file).collect();

    if !print_structured(&output, &reports)? {
        for report in &reports {
            match &report.error {
                None => println!(
                    "ok    {}: {} rules, {} scopes",
                    report.file.display(),
                    report.rules,
                    report.scopes
                ),
                Some(err) => println!("error {}: {}", report.file.display(), err),
            }
        }
    }

    Ok(if reports.iter().all(|report| report.ok) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn validate_file(file: PathBuf) -> FileReport {
    let compiled = compile_file(&file);
    match compiled {
        Ok((rules, scopes)) => FileReport {
            file,
            ok: true,
            rules,
            scopes,
            error: None,
        },
        Err(err) => FileReport {
            file,
            ok: false,
            rules: 0,
            scopes: 0,
            error: Some(err.to_string()),
        },
    }
}

fn compile_file(file: &Path) -> Result<(usize, usize)> {
    if !file.exists() {
        bail!("file not found");
    }
    let options = LoadOptions {
        paths: vec![file.to_path_buf()],
        include_env: false,
        unknown_scope: None,
    };
    let index = load_rule_set_with_options(&options)?.compile()?;
    Ok((index.rule_count(), index.scope_count()))
}

async fn show(ctx: &CliContext, output: OutputFormat) -> Result<ExitCode> {
    let center = ctx.rule_center().await?;
    let snapshot = center.snapshot();
    if print_structured(&output, &snapshot.view())? {
        return Ok(ExitCode::SUCCESS);
    }

    let index = &snapshot.index;
    println!(
        "Rule index rev {} → {} rules, {} scopes, unknown scope: {:?}",
        snapshot.rev,
        index.rule_count(),
        index.scope_count(),
        index.unknown_scope_policy()
    );
    for (scope, method, patterns) in index.entries() {
        let patterns: Vec<&str> = patterns.iter().map(|pattern| pattern.as_str()).collect();
        println!("{scope:<16} {method:<8} {}", patterns.join("  "));
    }
    Ok(ExitCode::SUCCESS)
}
