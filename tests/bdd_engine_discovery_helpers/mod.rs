//! Behavioural step helpers for engine discovery scenarios.

mod assertions;
mod state;

pub use state::{EngineDiscoveryState, engine_discovery_state};
