//! Socket resolution and container engine connection.
//!
//! This module resolves container engine endpoints from configuration, the
//! environment and platform defaults, and establishes connections using the
//! Bollard library. The operations built on a live connection (engine
//! discovery, image acquisition, container creation and start, provisioning)
//! live in the submodules and are exposed as associated functions on
//! [`EngineConnector`].

mod create_container;
mod discovery;
mod error_classification;
mod health_check;
mod image;
mod lifecycle;
mod provision;

use bollard::Docker;
use camino::Utf8PathBuf;

use crate::error::SandboxError;
use error_classification::classify_connection_error;

pub use create_container::{
    APP_WORKING_DIR, ContainerCreator, CreateContainerFuture, CreateContainerRequest,
};
pub use discovery::{
    ConnectFuture, DockerTransport, FALLBACK_SYSTEM_SOCKET, HOME_RELATIVE_SOCKETS, ProbeFuture,
    TransportCandidate, TransportConnector, transport_candidates,
};
pub use image::{
    ImageClient, ImagePresence, InspectImageFuture, PullFailure, PullImageFuture, PullStream,
    classify_pull_failure, classify_pull_output,
};
pub use lifecycle::{ContainerLifecycle, LifecycleFuture};
pub use provision::{ProvisionRequest, ProvisionSettings, ProvisionedContainer};

/// Environment variable names checked in fallback order after configuration sources.
const FALLBACK_ENV_VARS: &[&str] = &["DOCKER_HOST", "CONTAINER_HOST", "PODMAN_HOST"];

/// Environment variable naming the current user's home directory.
const HOME_ENV_VAR: &str = "HOME";

/// Connection timeout in seconds for Docker/Podman API connections.
const CONNECTION_TIMEOUT_SECS: u64 = 120;

/// Timeout in seconds for health check operations.
const HEALTH_CHECK_TIMEOUT_SECS: u64 = 10;

/// Default socket path for Unix platforms.
#[cfg(unix)]
const DEFAULT_SOCKET: &str = "unix:///var/run/docker.sock";

/// Default socket path for Windows platforms.
#[cfg(windows)]
const DEFAULT_SOCKET: &str = "npipe:////./pipe/docker_engine";

/// Resolves container engine socket endpoints from environment variables.
///
/// The resolver checks a prioritised list of environment variables to find
/// the socket endpoint when no explicit configuration is provided, and
/// locates the home directory used for per-user engine sockets.
///
/// # Type Parameters
///
/// * `E` - An environment provider implementing the `mockable::Env` trait,
///   allowing for testable environment variable access.
///
/// # Example
///
/// ```ignore
/// use mockable::DefaultEnv;
/// use code_sandbox::engine::SocketResolver;
///
/// let env = DefaultEnv::new();
/// let resolver = SocketResolver::new(&env);
///
/// if let Some(socket) = resolver.resolve_from_env() {
///     println!("Found socket: {}", socket);
/// }
/// ```
pub struct SocketResolver<'a, E: mockable::Env> {
    env: &'a E,
}

impl<'a, E: mockable::Env> SocketResolver<'a, E> {
    /// Creates a new socket resolver with the given environment provider.
    #[must_use]
    pub const fn new(env: &'a E) -> Self {
        Self { env }
    }

    /// Resolves the socket endpoint from fallback environment variables.
    ///
    /// Checks the following environment variables in order:
    /// 1. `DOCKER_HOST`
    /// 2. `CONTAINER_HOST`
    /// 3. `PODMAN_HOST`
    ///
    /// Returns `None` if no fallback variable is set or all are empty.
    #[must_use]
    pub fn resolve_from_env(&self) -> Option<String> {
        FALLBACK_ENV_VARS
            .iter()
            .filter_map(|var_name| self.env.string(var_name))
            .find(|value| !value.is_empty())
    }

    /// Returns the current user's home directory, when it can be determined.
    #[must_use]
    pub fn home_dir(&self) -> Option<Utf8PathBuf> {
        self.env
            .string(HOME_ENV_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(Utf8PathBuf::from)
    }

    /// Returns the platform default socket path.
    ///
    /// On Unix systems, this is `unix:///var/run/docker.sock`.
    /// On Windows systems, this is `npipe:////./pipe/docker_engine`.
    #[must_use]
    pub const fn default_socket() -> &'static str {
        DEFAULT_SOCKET
    }
}

/// Classifies socket endpoint types for connection handling.
enum SocketType {
    /// Unix socket or Windows named pipe with explicit scheme.
    Socket,
    /// HTTP, HTTPS, or TCP endpoint (TCP is rewritten to HTTP).
    Http,
    /// Bare path without scheme prefix.
    BarePath,
}

impl SocketType {
    /// Returns true if the socket string has a Unix or named pipe scheme.
    fn is_socket_scheme(socket: &str) -> bool {
        socket.starts_with("unix://") || socket.starts_with("npipe://")
    }

    /// Returns true if the socket string has an HTTP-compatible scheme.
    fn is_http_scheme(socket: &str) -> bool {
        socket.starts_with("tcp://")
            || socket.starts_with("http://")
            || socket.starts_with("https://")
    }

    /// Classify a socket string by its scheme prefix.
    fn classify(socket: &str) -> Self {
        match (Self::is_socket_scheme(socket), Self::is_http_scheme(socket)) {
            (true, _) => Self::Socket,
            (_, true) => Self::Http,
            _ => Self::BarePath,
        }
    }
}

/// Provides methods to connect to Docker or Podman container engines and to
/// provision sandbox containers on them.
pub struct EngineConnector;

impl EngineConnector {
    /// Build a client for the container engine at the specified endpoint.
    ///
    /// Supports the following endpoint formats:
    /// - Unix sockets: `unix:///path/to/socket`
    /// - Windows named pipes: `npipe:////./pipe/name`
    /// - TCP: `tcp://host:port` (treated as HTTP connection)
    /// - HTTP: `http://host:port`
    /// - HTTPS: `https://host:port`
    /// - Bare paths: Paths starting with `\\` or `//` are treated as Windows
    ///   named pipes. All other paths are treated as Unix sockets.
    ///
    /// Construction does not contact the engine; pair it with
    /// [`Self::health_check_async`] to confirm liveness.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::ConnectionFailed`, `SocketNotFound` or
    /// `PermissionDenied` if the client cannot be constructed.
    pub fn connect(socket: impl AsRef<str>) -> Result<Docker, SandboxError> {
        let socket_str = socket.as_ref();
        let socket_uri = match SocketType::classify(socket_str) {
            SocketType::Socket => socket_str.to_owned(),
            // Bollard has no tcp:// scheme.
            SocketType::Http => socket_str.replacen("tcp://", "http://", 1),
            SocketType::BarePath => Self::normalize_bare_path(socket_str),
        };

        let connected = if matches!(SocketType::classify(&socket_uri), SocketType::Http) {
            Docker::connect_with_http(
                &socket_uri,
                CONNECTION_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            )
        } else {
            Docker::connect_with_socket(
                &socket_uri,
                CONNECTION_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            )
        };

        connected.map_err(|error| SandboxError::from(classify_connection_error(&error, &socket_uri)))
    }

    /// Normalise a bare socket path to a URI with the appropriate scheme.
    ///
    /// Detection is based on path syntax, not the current platform: paths
    /// like `//some/path` are treated as named pipes even on Unix.
    fn normalize_bare_path(path: &str) -> String {
        if path.starts_with("\\\\") || path.starts_with("//") {
            format!("npipe://{path}")
        } else {
            format!("unix://{path}")
        }
    }

    /// Resolves the environment-derived endpoint without establishing a
    /// connection.
    ///
    /// Resolution order:
    /// 1. `config_socket` (from CLI, config file, or `CODE_SANDBOX_ENGINE_SOCKET`)
    /// 2. `DOCKER_HOST`, `CONTAINER_HOST`, `PODMAN_HOST` (via resolver)
    /// 3. Platform default socket
    #[must_use]
    pub fn resolve_socket<E: mockable::Env>(
        config_socket: Option<&str>,
        resolver: &SocketResolver<'_, E>,
    ) -> String {
        config_socket
            .filter(|s| !s.trim().is_empty())
            .map(String::from)
            .or_else(|| resolver.resolve_from_env())
            .unwrap_or_else(|| SocketResolver::<E>::default_socket().to_owned())
    }
}
