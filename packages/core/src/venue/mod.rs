//! Venue Check-In Module
//!
//! Tracks the user's current venue check-in, reminds them while they stay
//! checked in, closes stale check-ins automatically and keeps the history of
//! visits.

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod provider;
pub mod types;

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::repository::{ReminderRepository, VenueRecordRepository};
use provider::{AppStateObserver, Clock, NotificationTrigger};

pub use commands::CheckInService;
pub use config::CheckInConfig;
pub use engine::CheckInLifecycleEngine;
pub use error::{CheckInError, CheckInResult};
pub use types::*;

/// Serializes every mutating lifecycle operation.
///
/// Status-check passes and user commands all read-modify-write the same
/// slots, so they take this lock for their whole duration. Clones share the
/// same lock.
#[derive(Debug, Clone, Default)]
pub struct LifecycleLock {
    inner: Arc<Mutex<()>>,
}

impl LifecycleLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner.lock().await
    }
}

/// Everything the engine and the command surface are built from.
#[derive(Clone)]
pub struct Collaborators {
    pub venues: Arc<dyn VenueRecordRepository + Send + Sync>,
    pub reminders: Arc<dyn ReminderRepository + Send + Sync>,
    pub notifier: Arc<dyn NotificationTrigger + Send + Sync>,
    pub app_state: Arc<dyn AppStateObserver + Send + Sync>,
    pub clock: Arc<dyn Clock + Send + Sync>,
    pub lock: LifecycleLock,
}
