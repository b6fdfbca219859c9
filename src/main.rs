use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    pathwarden_cli::cli::app::run().await
}
