//! Scripted in-memory engine used by provisioning scenarios.

use std::sync::{Arc, Mutex};

use bollard::models::{ContainerCreateBody, ContainerCreateResponse};
use bollard::query_parameters::CreateContainerOptions;
use camino::Utf8Path;
use code_sandbox::engine::{
    ConnectFuture, ContainerCreator, ContainerLifecycle, CreateContainerFuture, ImageClient,
    InspectImageFuture, LifecycleFuture, ProbeFuture, PullImageFuture, PullStream,
    TransportCandidate, TransportConnector,
};
use code_sandbox::error::{ContainerError, SandboxError};
use futures_util::stream;

/// Container id handed out by the scripted engine.
pub const FAKE_CONTAINER_ID: &str = "bdd-container-id";

/// Behaviour the scripted engine exhibits.
#[derive(Debug, Clone, Default)]
pub struct EngineScript {
    /// Whether inspect reports the image as present.
    pub image_cached: bool,
    /// Error text returned by the pull call itself, if any.
    pub pull_call_error: Option<String>,
    /// Lines streamed by a successful pull call.
    pub pull_output: Vec<String>,
    /// Whether starting a container fails.
    pub start_fails: bool,
}

/// Calls observed by the scripted engine.
#[derive(Debug, Clone, Default)]
pub struct EngineRecord {
    /// Number of pull calls.
    pub pulls: usize,
    /// Body of every create call.
    pub created: Vec<ContainerCreateBody>,
    /// Ids passed to remove.
    pub removed: Vec<String>,
}

/// Engine double implementing every seam the provisioner needs.
#[derive(Debug, Clone)]
pub struct FakeEngine {
    script: EngineScript,
    record: Arc<Mutex<EngineRecord>>,
}

impl FakeEngine {
    fn record<F: FnOnce(&mut EngineRecord)>(&self, update: F) {
        if let Ok(mut locked) = self.record.lock() {
            update(&mut locked);
        }
    }
}

fn server_error(status_code: u16, message: &str) -> bollard::errors::Error {
    bollard::errors::Error::DockerResponseServerError {
        status_code,
        message: String::from(message),
    }
}

impl ImageClient for FakeEngine {
    fn inspect_image(&self, image: &str) -> InspectImageFuture<'_> {
        let result = if self.script.image_cached {
            Ok(())
        } else {
            Err(server_error(404, &format!("No such image: {image}")))
        };
        Box::pin(async move { result })
    }

    fn pull_image(&self, _image: &str) -> PullImageFuture<'_> {
        self.record(|record| record.pulls += 1);
        let call_error = self.script.pull_call_error.clone();
        let lines = self.script.pull_output.clone();
        Box::pin(async move {
            if let Some(message) = call_error {
                return Err(server_error(404, &message));
            }
            let progress = stream::iter(lines.into_iter().map(Ok));
            Ok(Box::pin(progress) as PullStream)
        })
    }
}

impl ContainerCreator for FakeEngine {
    fn create_container(
        &self,
        _options: Option<CreateContainerOptions>,
        config: ContainerCreateBody,
    ) -> CreateContainerFuture<'_> {
        self.record(|record| record.created.push(config));
        Box::pin(async {
            Ok(ContainerCreateResponse {
                id: String::from(FAKE_CONTAINER_ID),
                warnings: vec![],
            })
        })
    }
}

impl ContainerLifecycle for FakeEngine {
    fn start_container(&self, _container_id: &str) -> LifecycleFuture<'_> {
        let fails = self.script.start_fails;
        Box::pin(async move {
            if fails {
                return Err(server_error(500, "cannot start container: exec format error"));
            }
            Ok(())
        })
    }

    fn remove_container(&self, container_id: &str) -> LifecycleFuture<'_> {
        let container_id = String::from(container_id);
        self.record(|record| record.removed.push(container_id));
        Box::pin(async { Ok(()) })
    }
}

/// Transport whose default endpoint either yields a [`FakeEngine`] or
/// refuses; no fallback socket exists.
#[derive(Debug)]
pub struct FakeTransport {
    reachable: bool,
    engine: FakeEngine,
}

impl FakeTransport {
    /// Build a transport around a scripted engine.
    pub fn new(reachable: bool, script: EngineScript, record: Arc<Mutex<EngineRecord>>) -> Self {
        Self {
            reachable,
            engine: FakeEngine { script, record },
        }
    }
}

impl TransportConnector for FakeTransport {
    type Client = FakeEngine;

    fn socket_exists(&self, _path: &Utf8Path) -> bool {
        false
    }

    fn connect<'a>(&'a self, candidate: &'a TransportCandidate) -> ConnectFuture<'a, FakeEngine> {
        let connected = self.reachable.then(|| self.engine.clone());
        Box::pin(async move {
            connected.ok_or_else(|| {
                SandboxError::from(ContainerError::ConnectionFailed {
                    message: format!("connection refused: {candidate}"),
                })
            })
        })
    }

    fn probe<'a>(&'a self, _client: &'a FakeEngine) -> ProbeFuture<'a> {
        Box::pin(async { Ok(()) })
    }
}
