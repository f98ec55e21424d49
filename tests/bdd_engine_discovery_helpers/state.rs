//! Shared behavioural-test state for engine discovery scenarios.

use std::collections::HashMap;

use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

/// Step result type for engine discovery BDD tests.
pub type StepResult<T> = Result<T, String>;

/// Shared scenario state for engine discovery behavioural tests.
#[derive(Default, ScenarioState)]
pub struct EngineDiscoveryState {
    /// Environment variables visible to the resolver.
    pub(crate) env_vars: Slot<HashMap<String, String>>,

    /// Engine socket from configuration, if any.
    pub(crate) config_socket: Slot<Option<String>>,

    /// Candidate labels in evaluation order.
    pub(crate) candidates: Slot<Vec<String>>,
}

impl EngineDiscoveryState {
    /// Record an environment variable for the mocked environment.
    pub(crate) fn set_env(&self, name: String, value: String) {
        let mut vars = self.env_vars.get().unwrap_or_default();
        vars.insert(name, value);
        self.env_vars.set(vars);
    }
}

/// Fixture providing fresh state for each engine discovery scenario.
#[fixture]
pub fn engine_discovery_state() -> EngineDiscoveryState {
    let state = EngineDiscoveryState::default();
    state.env_vars.set(HashMap::new());
    state.config_socket.set(None);
    state
}
