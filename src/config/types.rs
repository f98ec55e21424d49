//! Configuration data types for code-sandbox.

use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};

/// Image used when a request does not name one.
///
/// Debian slim with Python gives callers a POSIX shell and a scripting
/// interpreter out of the box.
pub const DEFAULT_IMAGE: &str = "python:3.12-slim-bookworm";

/// Default pull budget in seconds.
pub const DEFAULT_PULL_TIMEOUT_SECS: u64 = 300;

/// Largest pull budget accepted, in seconds.
pub const MAX_PULL_TIMEOUT_SECS: u64 = 300;

/// Environment provisioning configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Image substituted when the request omits one or passes an empty string.
    pub default_image: String,

    /// Upper bound, in seconds, for pulling an image that is not cached.
    pub pull_timeout_secs: u64,

    /// Force-remove a container whose start failed after a successful create.
    pub remove_on_start_failure: bool,
}

impl ProvisionConfig {
    /// Validates provisioning values that cannot be expressed by types alone.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when `default_image` is blank or
    /// `pull_timeout_secs` is zero or above [`MAX_PULL_TIMEOUT_SECS`].
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.default_image.trim().is_empty() {
            return Err(crate::error::ConfigError::InvalidValue {
                field: String::from("provision.default_image"),
                reason: String::from("must not be empty"),
            }
            .into());
        }
        if self.pull_timeout_secs == 0 {
            return Err(crate::error::ConfigError::InvalidValue {
                field: String::from("provision.pull_timeout_secs"),
                reason: String::from("must be greater than zero"),
            }
            .into());
        }
        if self.pull_timeout_secs > MAX_PULL_TIMEOUT_SECS {
            return Err(crate::error::ConfigError::InvalidValue {
                field: String::from("provision.pull_timeout_secs"),
                reason: format!("must not exceed {MAX_PULL_TIMEOUT_SECS}"),
            }
            .into());
        }
        Ok(())
    }

    /// Return the pull budget as a [`Duration`].
    #[must_use]
    pub const fn pull_timeout(&self) -> Duration {
        Duration::from_secs(self.pull_timeout_secs)
    }
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            default_image: String::from(DEFAULT_IMAGE),
            pull_timeout_secs: DEFAULT_PULL_TIMEOUT_SECS,
            remove_on_start_failure: true,
        }
    }
}

/// Root application configuration.
///
/// This structure is loaded from configuration files, environment variables,
/// and command-line arguments with layered precedence. The precedence order
/// (lowest to highest) is: defaults, configuration file, environment variables,
/// command-line arguments.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `CODE_SANDBOX_CONFIG_PATH` environment variable
/// 2. `.code-sandbox.toml` in the current working directory
/// 3. `.code-sandbox.toml` in the home directory
/// 4. `~/.config/code-sandbox/config.toml` (XDG default)
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "CODE_SANDBOX",
    post_merge_hook,
    discovery(
        app_name = "code-sandbox",
        env_var = "CODE_SANDBOX_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".code-sandbox.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// Container engine socket path or URL tried before the environment.
    pub engine_socket: Option<String>,

    /// Environment provisioning configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub provision: ProvisionConfig,
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        // Blank sockets behave as unset so the environment lookup still runs.
        if self
            .engine_socket
            .as_ref()
            .is_some_and(|socket| socket.trim().is_empty())
        {
            self.engine_socket = None;
        }
        Ok(())
    }
}
