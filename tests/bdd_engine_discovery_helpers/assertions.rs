//! Then-step assertions for engine discovery scenarios.

use rstest_bdd_macros::then;

use super::state::{EngineDiscoveryState, StepResult};

fn candidates(engine_discovery_state: &EngineDiscoveryState) -> StepResult<Vec<String>> {
    engine_discovery_state
        .candidates
        .get()
        .ok_or_else(|| String::from("candidates should be listed"))
}

#[then("candidate {position} is {expected}")]
fn candidate_at_position_is(
    engine_discovery_state: &EngineDiscoveryState,
    position: usize,
    expected: String,
) -> StepResult<()> {
    let candidates = candidates(engine_discovery_state)?;
    let actual = position
        .checked_sub(1)
        .and_then(|index| candidates.get(index))
        .ok_or_else(|| format!("no candidate at position {position} in {candidates:?}"))?;

    if *actual == expected {
        return Ok(());
    }
    Err(format!("expected candidate {position} to be {expected}, got {actual}"))
}

#[then("there are {count} candidates")]
fn candidate_count_is(
    engine_discovery_state: &EngineDiscoveryState,
    count: usize,
) -> StepResult<()> {
    let candidates = candidates(engine_discovery_state)?;
    if candidates.len() == count {
        return Ok(());
    }
    Err(format!("expected {count} candidates, got {candidates:?}"))
}
