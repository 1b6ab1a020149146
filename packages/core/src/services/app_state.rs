use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::venue::provider::AppStateObserver;
use crate::venue::types::AppState;

/// Shared, settable app state.
///
/// The host flips it on lifecycle transitions (e.g. entering background)
/// and the engine reads it on every pass. Clones share the same state.
#[derive(Debug, Clone)]
pub struct AppStateHandle {
    state: Arc<AtomicU8>,
}

impl AppStateHandle {
    pub fn new(initial: AppState) -> Self {
        Self {
            state: Arc::new(AtomicU8::new(encode(initial))),
        }
    }

    pub fn set(&self, state: AppState) {
        self.state.store(encode(state), Ordering::SeqCst);
        tracing::debug!(?state, "App state changed");
    }
}

impl Default for AppStateHandle {
    fn default() -> Self {
        Self::new(AppState::Active)
    }
}

impl AppStateObserver for AppStateHandle {
    fn current_state(&self) -> AppState {
        decode(self.state.load(Ordering::SeqCst))
    }
}

fn encode(state: AppState) -> u8 {
    match state {
        AppState::Active => 0,
        AppState::Inactive => 1,
        AppState::Background => 2,
    }
}

fn decode(raw: u8) -> AppState {
    match raw {
        0 => AppState::Active,
        1 => AppState::Inactive,
        _ => AppState::Background,
    }
}
