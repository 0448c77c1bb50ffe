//! shellcheck-resolve binary entry point.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use shellcheck_cli::{Cli, Commands, cmd};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "shellcheck_core=debug,shellcheck_cli=debug"
        } else {
            "warn"
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Resolve { opts } => cmd::resolve::resolve(config, &opts, cli.quiet).await?,
        Commands::Arch { json, list } => cmd::arch::arch(json, list)?,
        Commands::Check {
            opts,
            include,
            paths,
            args,
        } => return cmd::check::check(config, &opts, cli.quiet, &include, &paths, &args).await,
        Commands::Completions { shell } => cmd::completions::completions(shell),
    }
    Ok(ExitCode::SUCCESS)
}
