//! Ordered discovery of a live container engine.
//!
//! Engine sockets live in different places depending on how the host runs
//! its engine (native daemon, Docker Desktop, Rancher Desktop, Colima). The
//! resolver evaluates an explicit, ordered list of [`TransportCandidate`]s
//! and returns the first client that both connects and answers a ping.
//! Socket candidates whose path is absent are skipped without a connection
//! attempt.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use bollard::Docker;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::debug;

use super::{EngineConnector, SocketResolver};
use crate::error::{ContainerError, SandboxError};

/// System-wide engine socket tried first among the fallbacks.
pub const FALLBACK_SYSTEM_SOCKET: &str = "/var/run/docker.sock";

/// Home-relative engine sockets, in evaluation order.
///
/// Rancher Desktop, Docker Desktop and Colima respectively.
pub const HOME_RELATIVE_SOCKETS: &[&str] = &[
    ".rd/docker.sock",
    ".docker/run/docker.sock",
    ".colima/default/docker.sock",
];

/// One way of reaching the container engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCandidate {
    /// The endpoint derived from configuration and the process environment.
    EnvironmentDefault {
        /// Endpoint URI or bare path.
        endpoint: String,
    },
    /// A well-known local socket path; only tried when it exists on disk.
    Socket {
        /// Absolute socket path.
        path: Utf8PathBuf,
    },
}

impl TransportCandidate {
    /// Return the socket path for filesystem-backed candidates.
    #[must_use]
    pub fn socket_path(&self) -> Option<&Utf8Path> {
        match self {
            Self::EnvironmentDefault { .. } => None,
            Self::Socket { path } => Some(path),
        }
    }
}

impl fmt::Display for TransportCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvironmentDefault { endpoint } => f.write_str(endpoint),
            Self::Socket { path } => f.write_str(path.as_str()),
        }
    }
}

/// Build the ordered candidate list.
///
/// The environment-derived endpoint comes first (see
/// [`EngineConnector::resolve_socket`]), then [`FALLBACK_SYSTEM_SOCKET`], then
/// [`HOME_RELATIVE_SOCKETS`] joined onto the home directory when one is
/// known.
#[must_use]
pub fn transport_candidates<E: mockable::Env>(
    config_socket: Option<&str>,
    resolver: &SocketResolver<'_, E>,
) -> Vec<TransportCandidate> {
    let mut candidates = vec![
        TransportCandidate::EnvironmentDefault {
            endpoint: EngineConnector::resolve_socket(config_socket, resolver),
        },
        TransportCandidate::Socket {
            path: Utf8PathBuf::from(FALLBACK_SYSTEM_SOCKET),
        },
    ];

    if let Some(home) = resolver.home_dir() {
        candidates.extend(
            HOME_RELATIVE_SOCKETS
                .iter()
                .map(|relative| TransportCandidate::Socket {
                    path: home.join(relative),
                }),
        );
    }

    candidates
}

/// Boxed future returned by [`TransportConnector::connect`].
pub type ConnectFuture<'a, C> = Pin<Box<dyn Future<Output = Result<C, SandboxError>> + Send + 'a>>;

/// Boxed future returned by [`TransportConnector::probe`].
pub type ProbeFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SandboxError>> + Send + 'a>>;

/// Behaviour required to try one candidate transport.
///
/// This abstraction keeps discovery testable without a running daemon or
/// real sockets on disk.
pub trait TransportConnector {
    /// Engine client produced by a successful connection.
    type Client;

    /// Report whether a socket path is present on the filesystem.
    fn socket_exists(&self, path: &Utf8Path) -> bool;

    /// Build a client for `candidate`, negotiating the API version.
    fn connect<'a>(&'a self, candidate: &'a TransportCandidate) -> ConnectFuture<'a, Self::Client>;

    /// Confirm a connected client is served by a responsive engine.
    fn probe<'a>(&'a self, client: &'a Self::Client) -> ProbeFuture<'a>;
}

/// [`TransportConnector`] backed by Bollard and the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerTransport;

impl TransportConnector for DockerTransport {
    type Client = Docker;

    fn socket_exists(&self, path: &Utf8Path) -> bool {
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return false;
        };
        Dir::open_ambient_dir(parent, ambient_authority()).is_ok_and(|dir| dir.exists(name))
    }

    fn connect<'a>(&'a self, candidate: &'a TransportCandidate) -> ConnectFuture<'a, Docker> {
        Box::pin(async move {
            match candidate {
                TransportCandidate::EnvironmentDefault { endpoint } => {
                    EngineConnector::connect_negotiated_async(endpoint).await
                }
                TransportCandidate::Socket { path } => {
                    EngineConnector::connect_negotiated_async(&format!("unix://{path}")).await
                }
            }
        })
    }

    fn probe<'a>(&'a self, client: &'a Docker) -> ProbeFuture<'a> {
        Box::pin(EngineConnector::health_check_async(client))
    }
}

impl EngineConnector {
    /// Return the first candidate client that connects and answers a ping.
    ///
    /// Candidates are evaluated strictly in order and evaluation stops at
    /// the first success. A client that connects but fails its probe is
    /// dropped before the next candidate is tried.
    ///
    /// # Errors
    ///
    /// Returns `ContainerError::EngineUnavailable` listing every candidate
    /// when none succeeds.
    pub async fn resolve_engine_async<T: TransportConnector>(
        connector: &T,
        candidates: &[TransportCandidate],
    ) -> Result<T::Client, SandboxError> {
        for candidate in candidates {
            if let Some(path) = candidate.socket_path() {
                if !connector.socket_exists(path) {
                    debug!(candidate = %candidate, "engine socket absent; skipping");
                    continue;
                }
            }

            match Self::try_candidate(connector, candidate).await {
                Ok(client) => {
                    debug!(candidate = %candidate, "connected to container engine");
                    return Ok(client);
                }
                Err(error) => {
                    debug!(candidate = %candidate, error = %error, "engine candidate unusable");
                }
            }
        }

        Err(ContainerError::EngineUnavailable {
            attempted: candidates.iter().map(ToString::to_string).collect(),
        }
        .into())
    }

    async fn try_candidate<T: TransportConnector>(
        connector: &T,
        candidate: &TransportCandidate,
    ) -> Result<T::Client, SandboxError> {
        let client = connector.connect(candidate).await?;
        connector.probe(&client).await?;
        Ok(client)
    }
}
