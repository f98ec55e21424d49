//! Image presence checks and bounded, classified image pulls.
//!
//! Acquisition is a two-stage decision. The transport-level outcome of the
//! pull (did the call and the drain finish within the budget) is classified
//! by [`classify_pull_failure`]; the drained payload text is then inspected
//! by [`classify_pull_output`], because registries can report a failure
//! inside a stream that otherwise completed successfully.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bollard::Docker;
use bollard::errors::Error as BollardError;
use bollard::models::CreateImageInfo;
use bollard::query_parameters::CreateImageOptionsBuilder;
use futures_util::{Stream, StreamExt, stream};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info};

use super::EngineConnector;
use crate::config::MAX_PULL_TIMEOUT_SECS;
use crate::error::{ImageError, PullStage, SandboxError};

/// Error text fragments meaning the registry has no such image or tag.
const NOT_FOUND_MARKERS: &[&str] = &["not found", "404", "manifest unknown"];

/// Error text fragments marking a failure embedded in pull output.
const ERROR_MARKERS: &[&str] = &["error", "Error"];

/// Boxed future returned by [`ImageClient::inspect_image`].
pub type InspectImageFuture<'a> =
    Pin<Box<dyn Future<Output = Result<(), BollardError>> + Send + 'a>>;

/// Pull progress rendered as text lines.
pub type PullStream = Pin<Box<dyn Stream<Item = Result<String, BollardError>> + Send>>;

/// Boxed future returned by [`ImageClient::pull_image`].
///
/// Resolves once the engine has accepted (or rejected) the pull request;
/// the progress stream must then be drained to complete the pull.
pub type PullImageFuture<'a> =
    Pin<Box<dyn Future<Output = Result<PullStream, BollardError>> + Send + 'a>>;

/// Behaviour required to check for and fetch images.
///
/// This abstraction exists to keep image acquisition testable without a
/// running daemon or registry.
pub trait ImageClient {
    /// Succeed when `image` is present in the local image store.
    fn inspect_image(&self, image: &str) -> InspectImageFuture<'_>;

    /// Begin pulling `image` from its registry.
    fn pull_image(&self, image: &str) -> PullImageFuture<'_>;
}

impl ImageClient for Docker {
    fn inspect_image(&self, image: &str) -> InspectImageFuture<'_> {
        let image = String::from(image);
        Box::pin(async move { Self::inspect_image(self, &image).await.map(|_| ()) })
    }

    fn pull_image(&self, image: &str) -> PullImageFuture<'_> {
        let options = CreateImageOptionsBuilder::new().from_image(image).build();
        let progress = Self::create_image(self, Some(options), None, None);
        Box::pin(split_pull_response(progress))
    }
}

/// Separate the engine's answer to a pull request from its progress output.
///
/// The request itself is only answered once the first item arrives, so a
/// transport or HTTP error at that point is a call-level failure. Everything
/// after it, including the first item when it is progress or an in-stream
/// error message, becomes text lines.
async fn split_pull_response<S>(progress: S) -> Result<PullStream, BollardError>
where
    S: Stream<Item = Result<CreateImageInfo, BollardError>> + Send + 'static,
{
    let mut progress = Box::pin(progress);
    let first = match progress.next().await {
        Some(Err(error)) if !matches!(error, BollardError::DockerStreamError { .. }) => {
            return Err(error);
        }
        first => first.map(render_progress),
    };

    let lines = stream::iter(first).chain(progress.map(render_progress));
    Ok(Box::pin(lines))
}

/// Render one pull progress item as a line of text.
///
/// Errors the engine reports inside the stream become text so that
/// [`classify_pull_output`] sees them; transport errors stay errors. Byte
/// counters are left out so sizes such as `404.5kB` cannot look like a
/// registry status code.
fn render_progress(
    item: Result<CreateImageInfo, BollardError>,
) -> Result<String, BollardError> {
    match item {
        Ok(info) => {
            let mut line = [info.id, info.status]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            if let Some(message) = info.error_detail.and_then(|detail| detail.message) {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str("error: ");
                line.push_str(&message);
            }
            Ok(line)
        }
        Err(BollardError::DockerStreamError { error }) => Ok(format!("error: {error}")),
        Err(error) => Err(error),
    }
}

/// Transport-level outcome of a pull stage that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullFailure {
    /// The pull budget expired before the stage finished.
    TimedOut,
    /// The stage failed with the given error text.
    Failed(String),
}

/// Classify a failed pull call or drain.
///
/// Expiry of the budget is checked first: a timeout can surface misleading
/// error text and must never be reported as a missing image.
#[must_use]
pub fn classify_pull_failure(image: &str, stage: PullStage, failure: &PullFailure) -> ImageError {
    let message = match failure {
        PullFailure::TimedOut => {
            return ImageError::PullTimeout {
                image: String::from(image),
                stage,
            };
        }
        PullFailure::Failed(message) => message,
    };

    if stage == PullStage::Request && contains_any(message, NOT_FOUND_MARKERS) {
        return ImageError::NotFoundInRegistry {
            image: String::from(image),
        };
    }

    match stage {
        PullStage::Request => ImageError::PullFailed {
            image: String::from(image),
            message: message.clone(),
        },
        PullStage::Download => ImageError::PullReadFailed {
            image: String::from(image),
            message: message.clone(),
        },
    }
}

/// Inspect the fully drained pull output for embedded failures.
///
/// # Errors
///
/// Returns `ImageError::NotFoundInRegistry` when the output carries a
/// not-found signal, or `ImageError::PullFailed` when it carries any other
/// error marker.
pub fn classify_pull_output(image: &str, output: &str) -> Result<(), ImageError> {
    if contains_any(output, NOT_FOUND_MARKERS) {
        return Err(ImageError::NotFoundInRegistry {
            image: String::from(image),
        });
    }
    if contains_any(output, ERROR_MARKERS) {
        return Err(ImageError::PullFailed {
            image: String::from(image),
            message: output.trim().to_owned(),
        });
    }
    Ok(())
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| text.contains(marker))
}

/// How an image came to be available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePresence {
    /// The image was already in the local store.
    Cached,
    /// The image was pulled during this attempt.
    Pulled,
}

impl EngineConnector {
    /// Ensure `image` is present locally, pulling it when inspection fails.
    ///
    /// Any inspection failure counts as "not present". The pull request and
    /// the drain of its progress stream share one deadline of `pull_timeout`
    /// from the start of the pull, capped at [`MAX_PULL_TIMEOUT_SECS`].
    /// Dropping the returned future cancels the pull.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::PullTimeout`, `NotFoundInRegistry`, `PullFailed`
    /// or `PullReadFailed` as classified by [`classify_pull_failure`] and
    /// [`classify_pull_output`].
    pub async fn ensure_image_async<C: ImageClient>(
        client: &C,
        image: &str,
        pull_timeout: Duration,
    ) -> Result<ImagePresence, SandboxError> {
        if client.inspect_image(image).await.is_ok() {
            info!(image, "image present locally");
            return Ok(ImagePresence::Cached);
        }

        let budget = pull_timeout.min(Duration::from_secs(MAX_PULL_TIMEOUT_SECS));
        info!(image, timeout_secs = budget.as_secs(), "image not present locally; pulling");
        let started = Instant::now();
        let deadline = started.checked_add(budget).unwrap_or(started);

        let progress = match timeout_at(deadline, client.pull_image(image)).await {
            Ok(Ok(progress)) => progress,
            Ok(Err(error)) => {
                let failure = PullFailure::Failed(error.to_string());
                return Err(classify_pull_failure(image, PullStage::Request, &failure).into());
            }
            Err(_) => {
                let failure = PullFailure::TimedOut;
                return Err(classify_pull_failure(image, PullStage::Request, &failure).into());
            }
        };

        let output = match timeout_at(deadline, drain_pull_output(progress)).await {
            Ok(Ok(output)) => output,
            Ok(Err(error)) => {
                let failure = PullFailure::Failed(error.to_string());
                return Err(classify_pull_failure(image, PullStage::Download, &failure).into());
            }
            Err(_) => {
                let failure = PullFailure::TimedOut;
                return Err(classify_pull_failure(image, PullStage::Download, &failure).into());
            }
        };

        classify_pull_output(image, &output)?;
        info!(image, "image pulled");
        Ok(ImagePresence::Pulled)
    }
}

/// Read the progress stream to completion, concatenating its lines.
///
/// The stream is consumed by value so it is closed on every exit path.
async fn drain_pull_output(mut progress: PullStream) -> Result<String, BollardError> {
    let mut output = String::new();
    while let Some(line) = progress.next().await {
        let line = line?;
        debug!(progress = %line, "pull progress");
        output.push_str(&line);
        output.push('\n');
    }
    Ok(output)
}
