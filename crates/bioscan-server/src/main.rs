mod commands;

use anyhow::{Context as _, Result};
use bioscan_config as config;
use bioscan_server::error::{exit_code_for, report_error};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{batch, export, extract, serve, Context};

#[derive(Debug, Parser)]
#[command(name = "bioscan", version, about = "Contact extraction for social profile bios")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve(serve::ServeArgs),
    /// Extract contacts from a raw profile JSON document
    Extract(extract::ExtractArgs),
    /// Write a saved list as CSV
    Export(export::ExportArgs),
    /// Look up every username in a CSV file
    Batch(batch::BatchArgs),
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        config: config_path,
        data_dir,
        verbose,
        command,
    } = cli;

    match command {
        Command::Extract(args) => extract::extract(args),
        command => {
            let mut app_config =
                config::load(config_path.clone()).with_context(|| "load config")?;
            if verbose {
                match config::resolve_config_path(config_path) {
                    Ok(path) if path.exists() => {
                        debug!(path = %path.display(), "config resolved");
                    }
                    Ok(path) => {
                        debug!(path = %path.display(), "config missing, using defaults");
                    }
                    Err(err) => {
                        debug!(error = %err, "config unavailable");
                    }
                }
            }
            if data_dir.is_some() {
                app_config.data_dir = data_dir;
            }

            let ctx = Context::new(app_config)?;
            match command {
                Command::Serve(args) => serve::serve(ctx, args),
                Command::Export(args) => export::export(&ctx, args),
                Command::Batch(args) => batch::batch(ctx, args),
                Command::Extract(_) => unreachable!("extract handled before config load"),
            }
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
