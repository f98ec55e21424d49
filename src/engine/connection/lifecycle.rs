//! Starting and removing sandbox containers.

use std::future::Future;
use std::pin::Pin;

use bollard::Docker;
use bollard::query_parameters::{RemoveContainerOptionsBuilder, StartContainerOptions};

use super::EngineConnector;
use crate::error::{ContainerError, SandboxError};

/// Boxed future type returned by [`ContainerLifecycle`] implementors.
pub type LifecycleFuture<'a> =
    Pin<Box<dyn Future<Output = Result<(), bollard::errors::Error>> + Send + 'a>>;

/// Behaviour required to start and remove containers.
pub trait ContainerLifecycle {
    /// Start a created container.
    fn start_container(&self, container_id: &str) -> LifecycleFuture<'_>;

    /// Force-remove a container, stopping it first if it is running.
    fn remove_container(&self, container_id: &str) -> LifecycleFuture<'_>;
}

impl ContainerLifecycle for Docker {
    fn start_container(&self, container_id: &str) -> LifecycleFuture<'_> {
        let container_id = String::from(container_id);
        Box::pin(async move {
            Self::start_container(self, &container_id, None::<StartContainerOptions>).await
        })
    }

    fn remove_container(&self, container_id: &str) -> LifecycleFuture<'_> {
        let container_id = String::from(container_id);
        let options = RemoveContainerOptionsBuilder::new().force(true).build();
        Box::pin(async move { Self::remove_container(self, &container_id, Some(options)).await })
    }
}

impl EngineConnector {
    /// Start a created container.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::StartFailed` when the engine rejects the
    /// start request.
    pub async fn start_container_async<C: ContainerLifecycle>(
        lifecycle: &C,
        container_id: &str,
    ) -> Result<(), SandboxError> {
        lifecycle
            .start_container(container_id)
            .await
            .map_err(|error| {
                SandboxError::from(ContainerError::StartFailed {
                    container_id: String::from(container_id),
                    message: error.to_string(),
                })
            })
    }
}
