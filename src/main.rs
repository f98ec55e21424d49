//! `code-sandbox` application entry point.
//!
//! This binary provisions sandbox containers from the command line. It uses
//! `eyre` for opaque error handling at the application boundary, converting
//! domain-specific errors into human-readable reports.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/code-sandbox/config.toml` or path from
//!    `CODE_SANDBOX_CONFIG_PATH`)
//! 3. Environment variables (`CODE_SANDBOX_*`)
//! 4. Command-line arguments

use std::process::ExitCode;

use clap::Parser;
use code_sandbox::api::{InitializeOutcome, initialize_environment};
use code_sandbox::config::{AppConfig, Cli, Commands, InitializeArgs, load_config};
use eyre::{Report, Result as EyreResult, WrapErr};
use mockable::DefaultEnv;
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// Loads configuration with layered precedence via `OrthoConfig`, then
/// dispatches to the subcommand handler. Provisioning failures are reported
/// on stdout and through the exit code; only start-up failures (logging,
/// configuration, runtime) surface as `eyre` reports.
fn main() -> EyreResult<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli).map_err(Report::from)?;

    let outcome = match &cli.command {
        Commands::Initialize(args) => initialize(&config, args)?,
    };

    report(&outcome);
    Ok(if outcome.is_ready() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Send diagnostics to stderr, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Provision one container on a fresh runtime.
fn initialize(config: &AppConfig, args: &InitializeArgs) -> EyreResult<InitializeOutcome> {
    let runtime = tokio::runtime::Runtime::new().wrap_err("failed to start async runtime")?;
    let env = DefaultEnv::new();
    Ok(runtime.block_on(initialize_environment(config, args.image.clone(), &env)))
}

#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn report(outcome: &InitializeOutcome) {
    println!("{}", outcome.text());
}
