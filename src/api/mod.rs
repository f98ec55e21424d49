//! Inbound provisioning call.
//!
//! [`initialize_environment`] is the single operation exposed to callers:
//! it resolves a live engine, provisions a container and reports the
//! outcome as a value. Every failure is rendered to text, so callers always
//! receive a response and tell success from failure by its shape.
//!
//! These functions do not print to stdout/stderr or call
//! `std::process::exit`.

use tracing::{error, info};

use crate::config::AppConfig;
use crate::engine::{
    ContainerCreator, ContainerLifecycle, DockerTransport, EngineConnector, ImageClient,
    ProvisionRequest, ProvisionSettings, SocketResolver, TransportCandidate, TransportConnector,
    transport_candidates,
};

/// Result of one provisioning attempt as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitializeOutcome {
    /// A container is running.
    Ready {
        /// Engine-assigned container identifier.
        container_id: String,
    },
    /// The attempt failed.
    Failed {
        /// Human-readable failure description.
        message: String,
    },
}

impl InitializeOutcome {
    /// Render the outcome as the response payload.
    ///
    /// Success is `container_id: <id>`; failure is `Error: <message>`.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Ready { container_id } => format!("container_id: {container_id}"),
            Self::Failed { message } => format!("Error: {message}"),
        }
    }

    /// Whether a container was provisioned.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Resolve an engine from `candidates` and provision a container on it.
///
/// The engine client is owned by this call and dropped on every exit path.
pub async fn initialize_environment_with<T>(
    connector: &T,
    candidates: &[TransportCandidate],
    request: &ProvisionRequest,
    settings: &ProvisionSettings,
) -> InitializeOutcome
where
    T: TransportConnector,
    T::Client: ImageClient + ContainerCreator + ContainerLifecycle,
{
    let attempt = async {
        let client = EngineConnector::resolve_engine_async(connector, candidates).await?;
        EngineConnector::provision_async(&client, request, settings).await
    };

    match attempt.await {
        Ok(provisioned) => {
            info!(
                container_id = %provisioned.container_id,
                image = %provisioned.image,
                "environment ready"
            );
            InitializeOutcome::Ready {
                container_id: provisioned.container_id,
            }
        }
        Err(failure) => {
            error!(error = %failure, "environment initialisation failed");
            InitializeOutcome::Failed {
                message: failure.to_string(),
            }
        }
    }
}

/// Provision a container for an optional image using the host's engine.
///
/// Candidates are derived from `config.engine_socket`, the engine
/// environment variables and the well-known socket locations.
pub async fn initialize_environment<E: mockable::Env>(
    config: &AppConfig,
    image: Option<String>,
    env: &E,
) -> InitializeOutcome {
    let resolver = SocketResolver::new(env);
    let candidates = transport_candidates(config.engine_socket.as_deref(), &resolver);
    let request = ProvisionRequest::new(image);
    let settings = ProvisionSettings::from_app_config(config);

    initialize_environment_with(&DockerTransport, &candidates, &request, &settings).await
}
