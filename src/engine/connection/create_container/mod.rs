//! Container creation for interactive sandbox sessions.
//!
//! Containers are created with a fixed working directory, a pseudo-terminal
//! and a persistently open standard input so callers can drive multi-step
//! sessions. No resource limits or networking overrides are applied here.

use std::future::Future;
use std::pin::Pin;

use bollard::Docker;
use bollard::models::{ContainerCreateBody, ContainerCreateResponse, HostConfig};
use bollard::query_parameters::CreateContainerOptions;

use super::EngineConnector;
use crate::error::{ConfigError, ContainerError, SandboxError};

/// Working directory of every sandbox container.
pub const APP_WORKING_DIR: &str = "/app";

/// Boxed future type returned by [`ContainerCreator`] implementors.
pub type CreateContainerFuture<'a> = Pin<
    Box<dyn Future<Output = Result<ContainerCreateResponse, bollard::errors::Error>> + Send + 'a>,
>;

/// Behaviour required to create a container via a backing engine client.
///
/// This abstraction exists to keep container-creation logic testable without a
/// running daemon.
pub trait ContainerCreator {
    /// Create a container from `Bollard` options and body payload.
    fn create_container(
        &self,
        options: Option<CreateContainerOptions>,
        config: ContainerCreateBody,
    ) -> CreateContainerFuture<'_>;
}

impl ContainerCreator for Docker {
    fn create_container(
        &self,
        options: Option<CreateContainerOptions>,
        config: ContainerCreateBody,
    ) -> CreateContainerFuture<'_> {
        Box::pin(async move { Self::create_container(self, options, config).await })
    }
}

/// Container-creation request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateContainerRequest {
    image: String,
    working_dir: String,
    tty: bool,
    open_stdin: bool,
}

impl CreateContainerRequest {
    /// Create an interactive request for `image`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when `image` is empty or
    /// whitespace-only. Any other value is kept verbatim.
    pub fn new(image: impl Into<String>) -> Result<Self, SandboxError> {
        let image_value = image.into();
        if image_value.trim().is_empty() {
            return Err(SandboxError::from(ConfigError::InvalidValue {
                field: String::from("image"),
                reason: String::from("must not be empty"),
            }));
        }

        Ok(Self {
            image: image_value,
            working_dir: String::from(APP_WORKING_DIR),
            tty: true,
            open_stdin: true,
        })
    }

    /// Return the configured image.
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Return the working directory.
    #[must_use]
    pub fn working_dir(&self) -> &str {
        &self.working_dir
    }

    /// Whether a pseudo-terminal is allocated.
    #[must_use]
    pub const fn tty(&self) -> bool {
        self.tty
    }

    /// Whether standard input stays open across attaches.
    #[must_use]
    pub const fn open_stdin(&self) -> bool {
        self.open_stdin
    }
}

impl EngineConnector {
    /// Create a container using a provided client abstraction.
    ///
    /// The engine assigns the container name.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::CreateFailed` when the engine rejects the
    /// create request.
    pub async fn create_container_async<C: ContainerCreator>(
        creator: &C,
        request: &CreateContainerRequest,
    ) -> Result<String, SandboxError> {
        let response = creator
            .create_container(None, build_create_body(request))
            .await
            .map_err(|error| {
                SandboxError::from(ContainerError::CreateFailed {
                    message: error.to_string(),
                })
            })?;

        for warning in &response.warnings {
            tracing::warn!(container_id = %response.id, warning = %warning, "engine warning on create");
        }

        Ok(response.id)
    }
}

fn build_create_body(request: &CreateContainerRequest) -> ContainerCreateBody {
    ContainerCreateBody {
        image: Some(String::from(request.image())),
        working_dir: Some(String::from(request.working_dir())),
        tty: Some(request.tty()),
        open_stdin: Some(request.open_stdin()),
        // Keep stdin open after the first attach detaches.
        stdin_once: Some(false),
        host_config: Some(HostConfig::default()),
        ..ContainerCreateBody::default()
    }
}
