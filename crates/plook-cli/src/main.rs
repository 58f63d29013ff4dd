//! # plook
//!
//! HTTP service that serves files out of the GitHub repositories behind npm
//! and Bower packages: `GET /{package}/{version}/{file}` resolves the
//! package's repository and version through the registry and relays the file
//! from the raw-content host.
//!
//! This is the binary entry point. It parses the command line, sets up
//! logging, loads the layered configuration and dispatches to a command.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod server;

use commands::CommandContext;

/// Serve files from the GitHub repositories behind registry packages
#[derive(Parser, Debug)]
#[command(name = "plook", version, about = "Serve files from the GitHub repositories behind registry packages")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file, instead of searching for plook.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Address to bind
    #[arg(long, global = true, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Registry packages are resolved against
    #[arg(long, global = true, value_parser = ["npm", "bower"])]
    pub registry: Option<String>,

    /// Raw-content host files are fetched from
    #[arg(long, global = true, value_name = "URL")]
    pub raw_host: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Print the candidate URLs of a file without fetching them
    Resolve {
        package: String,
        version: String,
        file: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.json_logs);
    setup_panic_handler();

    info!("Starting plook v{}", env!("CARGO_PKG_VERSION"));

    run_cli(cli)
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()
        .context("Failed to create async runtime")?;

    rt.block_on(async {
        let ctx = CommandContext::new()?;
        let config = ctx.load_config(&cli).await
            .map_err(|e| {
                ctx.output.error(&ctx.errors.format_error(&e));
                e
            })
            .context("Failed to load configuration")?;

        let command = cli.command.unwrap_or(Commands::Serve);
        commands::dispatch_command(command, &config, &ctx).await?;
        Ok::<(), anyhow::Error>(())
    })
}

fn setup_logging(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "plook={level},plook_core={level},plook_config={level},plook_registry={level},plook_resolver={level}"
        ))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("plook encountered an unexpected error: {}", panic_info);
        eprintln!("plook crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/plook/plook/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
