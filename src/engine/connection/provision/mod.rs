//! End-to-end provisioning of a sandbox container on a connected engine.
//!
//! One attempt runs `ensure image -> create -> start` with no retries; the
//! first failure ends the attempt.

use std::time::Duration;

use tracing::{info, warn};

use super::{
    ContainerCreator, ContainerLifecycle, CreateContainerRequest, EngineConnector, ImageClient,
    ImagePresence,
};
use crate::config::{AppConfig, DEFAULT_IMAGE, DEFAULT_PULL_TIMEOUT_SECS};
use crate::error::SandboxError;

/// Caller-supplied parameters for one provisioning attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionRequest {
    /// Requested image; `None` or an empty string selects the default image.
    pub image: Option<String>,
}

impl ProvisionRequest {
    /// Build a request for an optional image reference.
    #[must_use]
    pub const fn new(image: Option<String>) -> Self {
        Self { image }
    }

    /// Return the image to provision, substituting the configured default.
    ///
    /// Only a missing or empty reference is replaced. Any other value,
    /// including one with surrounding whitespace, reaches the engine as
    /// given and is judged there.
    #[must_use]
    pub fn resolved_image<'a>(&'a self, settings: &'a ProvisionSettings) -> &'a str {
        self.image
            .as_deref()
            .filter(|image| !image.is_empty())
            .unwrap_or(settings.default_image.as_str())
    }
}

/// Policy applied to every provisioning attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSettings {
    /// Image used when the request does not name one.
    pub default_image: String,
    /// Budget shared by the pull request and the drain of its progress.
    pub pull_timeout: Duration,
    /// Force-remove a container whose start failed.
    pub remove_on_start_failure: bool,
}

impl ProvisionSettings {
    /// Derive settings from loaded application configuration.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            default_image: config.provision.default_image.clone(),
            pull_timeout: config.provision.pull_timeout(),
            remove_on_start_failure: config.provision.remove_on_start_failure,
        }
    }
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self {
            default_image: String::from(DEFAULT_IMAGE),
            pull_timeout: Duration::from_secs(DEFAULT_PULL_TIMEOUT_SECS),
            remove_on_start_failure: true,
        }
    }
}

/// A running sandbox container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedContainer {
    /// Engine-assigned container identifier.
    pub container_id: String,
    /// Image the container runs.
    pub image: String,
    /// Whether the image was cached or pulled for this attempt.
    pub presence: ImagePresence,
}

impl EngineConnector {
    /// Ensure the image, then create and start an interactive container.
    ///
    /// A container is only created once its image is confirmed present.
    /// When start fails and `remove_on_start_failure` is set, the created
    /// container is force-removed on a best-effort basis before the start
    /// error is returned; the orphan's identifier is never returned.
    ///
    /// # Errors
    ///
    /// Returns the image error from [`Self::ensure_image_async`],
    /// `ContainerError::CreateFailed` or `ContainerError::StartFailed`.
    pub async fn provision_async<C>(
        client: &C,
        request: &ProvisionRequest,
        settings: &ProvisionSettings,
    ) -> Result<ProvisionedContainer, SandboxError>
    where
        C: ImageClient + ContainerCreator + ContainerLifecycle,
    {
        let image = request.resolved_image(settings);
        let presence = Self::ensure_image_async(client, image, settings.pull_timeout).await?;

        let create_request = CreateContainerRequest::new(image)?;
        let container_id = Self::create_container_async(client, &create_request).await?;
        info!(container_id = %container_id, image, "container created");

        if let Err(error) = Self::start_container_async(client, &container_id).await {
            if settings.remove_on_start_failure {
                Self::discard_container(client, &container_id).await;
            }
            return Err(error);
        }

        info!(container_id = %container_id, "container started");
        Ok(ProvisionedContainer {
            container_id,
            image: String::from(image),
            presence,
        })
    }

    async fn discard_container<C: ContainerLifecycle>(client: &C, container_id: &str) {
        match client.remove_container(container_id).await {
            Ok(()) => info!(container_id, "removed container that failed to start"),
            Err(error) => warn!(
                container_id,
                error = %error,
                "could not remove container that failed to start"
            ),
        }
    }
}
