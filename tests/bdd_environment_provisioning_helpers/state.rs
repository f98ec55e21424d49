//! Shared behavioural-test state for environment-provisioning scenarios.

use std::sync::{Arc, Mutex};

use code_sandbox::api::InitializeOutcome;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

use super::engine::{EngineRecord, EngineScript};

/// Step result type for environment-provisioning BDD tests.
pub type StepResult<T> = Result<T, String>;

/// Shared scenario state for environment-provisioning behavioural tests.
#[derive(Default, ScenarioState)]
pub struct ProvisioningState {
    /// Whether the default transport reaches an engine.
    pub(crate) engine_reachable: Slot<bool>,

    /// Scripted engine behaviour.
    pub(crate) script: Slot<EngineScript>,

    /// Calls observed by the scripted engine.
    pub(crate) record: Slot<Arc<Mutex<EngineRecord>>>,

    /// Candidate labels offered to the resolver.
    pub(crate) candidates: Slot<Vec<String>>,

    /// Outcome of the most recent initialise call.
    pub(crate) outcome: Slot<InitializeOutcome>,
}

impl ProvisioningState {
    /// Apply `update` to the scripted engine behaviour.
    pub(crate) fn update_script<F: FnOnce(&mut EngineScript)>(&self, update: F) {
        let mut script = self.script.get().unwrap_or_default();
        update(&mut script);
        self.script.set(script);
    }

    /// Snapshot the calls recorded so far.
    pub(crate) fn recorded(&self) -> StepResult<EngineRecord> {
        let record = self
            .record
            .get()
            .ok_or_else(|| String::from("engine record should be set"))?;
        let locked = record
            .lock()
            .map_err(|_| String::from("engine record mutex is poisoned"))?;
        Ok(locked.clone())
    }
}

/// Fixture providing fresh state for each provisioning scenario.
#[fixture]
pub fn provisioning_state() -> ProvisioningState {
    let state = ProvisioningState::default();
    state.engine_reachable.set(false);
    state.script.set(EngineScript::default());
    state.record.set(Arc::new(Mutex::new(EngineRecord::default())));
    state
}
