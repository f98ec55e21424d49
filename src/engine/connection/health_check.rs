//! Liveness probing for container engines.
//!
//! A socket that accepts connections is not necessarily served by a
//! responsive engine, so every candidate transport is confirmed with a ping
//! bounded by [`HEALTH_CHECK_TIMEOUT_SECS`] before it is used.

use std::time::Duration;

use bollard::Docker;

use super::{EngineConnector, HEALTH_CHECK_TIMEOUT_SECS};
use crate::error::{ContainerError, SandboxError};

impl EngineConnector {
    /// Perform a ping with timeout.
    async fn ping_with_timeout(docker: &Docker) -> Result<(), SandboxError> {
        let timeout = Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS);

        tokio::time::timeout(timeout, docker.ping())
            .await
            .map_err(|_| {
                SandboxError::from(ContainerError::HealthCheckTimeout {
                    seconds: HEALTH_CHECK_TIMEOUT_SECS,
                })
            })?
            .map_err(|e| {
                SandboxError::from(ContainerError::HealthCheckFailed {
                    message: e.to_string(),
                })
            })?;
        Ok(())
    }

    /// Verify the container engine is responsive.
    ///
    /// Sends a ping request to the engine and waits for a response.
    /// This confirms the engine is operational, not just that the socket
    /// is reachable.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::HealthCheckFailed` if the engine does not
    /// respond correctly.
    ///
    /// Returns `ContainerError::HealthCheckTimeout` if the check times out.
    pub async fn health_check_async(docker: &Docker) -> Result<(), SandboxError> {
        Self::ping_with_timeout(docker).await
    }

    /// Build a client and negotiate the API version with the engine.
    pub(super) async fn connect_negotiated_async(socket: &str) -> Result<Docker, SandboxError> {
        let docker = Self::connect(socket)?;
        docker.negotiate_version().await.map_err(|error| {
            SandboxError::from(ContainerError::ConnectionFailed {
                message: format!("API version negotiation with {socket} failed: {error}"),
            })
        })
    }
}
