//! Then-step assertions for environment-provisioning scenarios.

use code_sandbox::api::InitializeOutcome;
use code_sandbox::config::DEFAULT_IMAGE;
use code_sandbox::engine::APP_WORKING_DIR;
use rstest_bdd_macros::then;

use super::engine::FAKE_CONTAINER_ID;
use super::state::{ProvisioningState, StepResult};

fn outcome(provisioning_state: &ProvisioningState) -> StepResult<InitializeOutcome> {
    provisioning_state
        .outcome
        .get()
        .ok_or_else(|| String::from("initialise outcome should be set"))
}

fn failure_text(provisioning_state: &ProvisioningState) -> StepResult<String> {
    let outcome = outcome(provisioning_state)?;
    if outcome.is_ready() {
        return Err(format!("expected failure, got {}", outcome.text()));
    }
    let text = outcome.text();
    if !text.starts_with("Error: ") {
        return Err(format!("failure payload should start with 'Error: ', got {text}"));
    }
    Ok(text)
}

#[then("provisioning succeeds with a container id")]
fn provisioning_succeeds(provisioning_state: &ProvisioningState) -> StepResult<()> {
    match outcome(provisioning_state)? {
        InitializeOutcome::Ready { container_id } if container_id == FAKE_CONTAINER_ID => Ok(()),
        other => Err(format!("expected container {FAKE_CONTAINER_ID}, got {other:?}")),
    }
}

#[then("the container runs the default image")]
fn container_runs_default_image(provisioning_state: &ProvisioningState) -> StepResult<()> {
    let record = provisioning_state.recorded()?;
    let body = record
        .created
        .first()
        .ok_or_else(|| String::from("a container should have been created"))?;
    if body.image.as_deref() == Some(DEFAULT_IMAGE) {
        return Ok(());
    }
    Err(format!("expected image {DEFAULT_IMAGE}, got {:?}", body.image))
}

#[then("the container works in /app with a tty and open stdin")]
fn container_is_interactive(provisioning_state: &ProvisioningState) -> StepResult<()> {
    let record = provisioning_state.recorded()?;
    let body = record
        .created
        .first()
        .ok_or_else(|| String::from("a container should have been created"))?;

    if body.working_dir.as_deref() != Some(APP_WORKING_DIR) {
        return Err(format!("expected working dir /app, got {:?}", body.working_dir));
    }
    if body.tty != Some(true) {
        return Err(String::from("expected a tty"));
    }
    if body.open_stdin != Some(true) || body.stdin_once != Some(false) {
        return Err(String::from("expected stdin to stay open"));
    }
    Ok(())
}

#[then("no image pull was attempted")]
fn no_image_pull(provisioning_state: &ProvisioningState) -> StepResult<()> {
    let pulls = provisioning_state.recorded()?.pulls;
    if pulls == 0 {
        return Ok(());
    }
    Err(format!("expected no pulls, got {pulls}"))
}

#[then("the image was pulled once")]
fn image_pulled_once(provisioning_state: &ProvisioningState) -> StepResult<()> {
    let pulls = provisioning_state.recorded()?.pulls;
    if pulls == 1 {
        return Ok(());
    }
    Err(format!("expected one pull, got {pulls}"))
}

#[then("no container was created")]
fn no_container_created(provisioning_state: &ProvisioningState) -> StepResult<()> {
    let created = provisioning_state.recorded()?.created.len();
    if created == 0 {
        return Ok(());
    }
    Err(format!("expected no containers, got {created}"))
}

#[then("provisioning fails mentioning \"{text}\"")]
fn provisioning_fails_mentioning(
    provisioning_state: &ProvisioningState,
    text: String,
) -> StepResult<()> {
    let payload = failure_text(provisioning_state)?;
    if payload.contains(&text) {
        return Ok(());
    }
    Err(format!("expected failure mentioning {text:?}, got {payload}"))
}

#[then("provisioning fails listing every candidate socket")]
fn provisioning_fails_listing_candidates(
    provisioning_state: &ProvisioningState,
) -> StepResult<()> {
    let payload = failure_text(provisioning_state)?;
    let candidates = provisioning_state
        .candidates
        .get()
        .ok_or_else(|| String::from("candidates should be recorded"))?;
    if candidates.len() != 5 {
        return Err(format!("expected five candidates, got {candidates:?}"));
    }
    match candidates.iter().find(|candidate| !payload.contains(candidate.as_str())) {
        Some(missing) => Err(format!("failure should list {missing}, got {payload}")),
        None => Ok(()),
    }
}

#[then("the orphaned container was removed")]
fn orphaned_container_removed(provisioning_state: &ProvisioningState) -> StepResult<()> {
    let removed = provisioning_state.recorded()?.removed;
    if removed == [String::from(FAKE_CONTAINER_ID)] {
        return Ok(());
    }
    Err(format!("expected {FAKE_CONTAINER_ID} to be removed, got {removed:?}"))
}
