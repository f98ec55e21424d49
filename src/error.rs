//! Semantic error types for the code-sandbox library.
//!
//! This module defines the error hierarchy for code-sandbox, following the
//! principle of using semantic error enums (via `thiserror`) for conditions
//! the caller might inspect or report, while reserving opaque errors
//! (`eyre::Report`) for the application boundary.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found at the expected path.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path where the configuration file was expected.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error during configuration loading.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors that can occur while reaching the engine or managing containers.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Failed to connect to the container engine socket.
    #[error("failed to connect to container engine: {message}")]
    ConnectionFailed {
        /// A description of the connection failure.
        message: String,
    },

    /// The container engine socket was not found.
    #[error("container engine socket not found: {path}")]
    SocketNotFound {
        /// The path where the socket was expected.
        path: PathBuf,
    },

    /// Permission denied when accessing the container engine socket.
    #[error("permission denied accessing container socket: {path}")]
    PermissionDenied {
        /// The path to the socket.
        path: PathBuf,
    },

    /// Health check failed - engine did not respond correctly.
    #[error("container engine health check failed: {message}")]
    HealthCheckFailed {
        /// A description of the health check failure.
        message: String,
    },

    /// Health check timed out.
    #[error("container engine health check timed out after {seconds} seconds")]
    HealthCheckTimeout {
        /// The timeout duration in seconds.
        seconds: u64,
    },

    /// No candidate transport both connected and answered a ping.
    #[error(
        "could not connect to container engine; tried the environment default and socket paths: {}",
        .attempted.join(", ")
    )]
    EngineUnavailable {
        /// Every candidate endpoint considered, in evaluation order.
        attempted: Vec<String>,
    },

    /// Failed to create a container.
    #[error("failed to create container: {message}")]
    CreateFailed {
        /// A description of the creation failure.
        message: String,
    },

    /// Failed to start a container.
    #[error("failed to start container '{container_id}': {message}")]
    StartFailed {
        /// The ID of the container that failed to start.
        container_id: String,
        /// A description of the start failure.
        message: String,
    },
}

/// Which part of an image pull a failure was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullStage {
    /// Issuing the pull request to the engine.
    Request,
    /// Draining the streamed pull response.
    Download,
}

/// Errors that can occur while ensuring an image is present locally.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The pull did not complete within its time budget.
    #[error(
        "timeout while trying to pull docker image {image} ({}); the image may not exist in the registry or the registry may be unreachable",
        .stage.describe()
    )]
    PullTimeout {
        /// The requested image reference.
        image: String,
        /// Where the deadline expired.
        stage: PullStage,
    },

    /// The registry reported that the image or tag does not exist.
    #[error(
        "docker image {image} not found in registry; check that the image name and tag are correct"
    )]
    NotFoundInRegistry {
        /// The requested image reference.
        image: String,
    },

    /// The pull failed for any other reason.
    #[error("failed to pull docker image {image}: {message}")]
    PullFailed {
        /// The requested image reference.
        image: String,
        /// The underlying engine or payload message.
        message: String,
    },

    /// The pull response stream could not be read to completion.
    #[error("failed to read pull response for image {image}: {message}")]
    PullReadFailed {
        /// The requested image reference.
        image: String,
        /// The underlying read failure.
        message: String,
    },
}

impl PullStage {
    const fn describe(self) -> &'static str {
        match self {
            Self::Request => "requesting pull",
            Self::Download => "downloading layers",
        }
    }
}

/// Top-level error type for the code-sandbox library.
///
/// This enum aggregates all domain-specific errors into a single type. At the
/// inbound boundary every variant is rendered to text; the binary converts
/// the remaining configuration failures to `eyre::Report`.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred while reaching the engine or managing containers.
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// An error occurred while ensuring the image is available.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// A specialised `Result` type for code-sandbox operations.
pub type Result<T> = std::result::Result<T, SandboxError>;
