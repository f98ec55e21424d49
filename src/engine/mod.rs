//! Container engine connection and sandbox provisioning.
//!
//! The engine is located by trying an ordered list of candidate transports.
//! The first candidate is derived from configuration and the environment:
//!
//! 1. CLI argument (`--engine-socket`)
//! 2. Config file (`engine_socket` in TOML)
//! 3. `CODE_SANDBOX_ENGINE_SOCKET` environment variable
//! 4. `DOCKER_HOST` environment variable
//! 5. `CONTAINER_HOST` environment variable
//! 6. `PODMAN_HOST` environment variable
//! 7. Platform default (`/var/run/docker.sock` on Unix)
//!
//! It is followed by `/var/run/docker.sock` and the per-user sockets of
//! Rancher Desktop, Docker Desktop and Colima, each tried only when present.

mod connection;

pub use connection::{
    APP_WORKING_DIR, ConnectFuture, ContainerCreator, ContainerLifecycle, CreateContainerFuture,
    CreateContainerRequest, DockerTransport, EngineConnector, FALLBACK_SYSTEM_SOCKET,
    HOME_RELATIVE_SOCKETS, ImageClient, ImagePresence, InspectImageFuture, LifecycleFuture,
    ProbeFuture, ProvisionRequest, ProvisionSettings, ProvisionedContainer, PullFailure,
    PullImageFuture, PullStream, SocketResolver, TransportCandidate, TransportConnector,
    classify_pull_failure, classify_pull_output, transport_candidates,
};
