//! Configuration system for code-sandbox.
//!
//! This module provides the configuration structures and CLI definitions for the
//! code-sandbox application. Configuration loading and precedence merging is
//! handled by the `ortho_config` crate: CLI flags override environment
//! variables, which override configuration files, which override defaults.
//!
//! The configuration file is expected at `~/.config/code-sandbox/config.toml`
//! by default.
//!
//! # Example Configuration
//!
//! ```toml
//! engine_socket = "unix:///run/user/1000/docker.sock"
//!
//! [provision]
//! default_image = "python:3.12-slim-bookworm"
//! pull_timeout_secs = 300
//! remove_on_start_failure = true
//! ```

mod cli;
mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{Cli, Commands, InitializeArgs};
pub use loader::{env_var_names, load_config};
pub use types::{
    AppConfig, DEFAULT_IMAGE, DEFAULT_PULL_TIMEOUT_SECS, MAX_PULL_TIMEOUT_SECS, ProvisionConfig,
};
