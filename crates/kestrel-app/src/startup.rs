//! Startup state loading
//!
//! One load attempt against the session store; anything that goes wrong
//! falls back to the default state. Startup never fails because the last
//! session left a bad file behind.

use kestrel_core::state::AppState;

use crate::store::{SessionStore, StoreError};

/// How the process is being run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Regular interactive run
    #[default]
    Normal,
    /// Test run: ignore ambient session state, never persist
    Test,
}

impl RunMode {
    /// Detect the run mode from the environment (`KESTREL_ENV=test`)
    pub fn from_env() -> Self {
        match std::env::var("KESTREL_ENV") {
            Ok(v) if v == "test" => RunMode::Test,
            _ => RunMode::Normal,
        }
    }

    /// Whether this run keeps its session out of the store
    pub fn is_test(self) -> bool {
        self == RunMode::Test
    }
}

/// Load the state to start from
///
/// Exactly one load attempt. Failures are logged and replaced by the
/// default state. Test runs discard whatever was loaded, so ambient
/// session files cannot leak into them.
pub async fn load_initial_state(store: &dyn SessionStore, mode: RunMode) -> AppState {
    let attempt = store.load().await;

    if mode.is_test() {
        log::debug!("Test run: ignoring saved session state");
        return AppState::default();
    }

    match attempt {
        Ok(state) => {
            log::info!("Restored session state: {} windows", state.windows.len());
            state
        }
        Err(StoreError::NotFound) => {
            log::debug!("No saved session, starting fresh");
            AppState::default()
        }
        Err(e) => {
            log::warn!("Failed to load saved session, starting fresh: {e}");
            AppState::default()
        }
    }
}
