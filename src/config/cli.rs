//! Command-line argument definitions for code-sandbox.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Command-line interface for code-sandbox.
#[derive(Debug, Parser)]
#[command(name = "code-sandbox")]
#[command(
    author,
    version,
    about = "Provision isolated containers for sandboxed code execution"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Container engine socket path or URL.
    #[arg(long, global = true)]
    pub engine_socket: Option<String>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create and start a fresh sandbox container.
    Initialize(InitializeArgs),
}

/// Arguments for the `initialize` subcommand.
#[derive(Debug, Parser)]
pub struct InitializeArgs {
    /// Image to run; the configured default image is used when omitted or empty.
    #[arg(long)]
    pub image: Option<String>,
}
