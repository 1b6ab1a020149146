//! In-memory check-in store.
//!
//! `InMemoryStore` implements both repository traits over plain fields
//! behind a `tokio::sync::RwLock`, so it can be shared as
//! `Arc<InMemoryStore>` between the engine, the command surface and a test
//! body. Any operation can be told to fail with `StorageUnavailable`, which
//! is how the error paths of the engine and command surface are exercised.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::repository::{ReminderRepository, VenueRecordRepository};
use crate::venue::error::{CheckInError, CheckInResult};
use crate::venue::types::VenueRecord;

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    GetCurrent,
    SaveCurrent,
    GetVisited,
    SaveVisit,
    RemoveCurrent,
    RemoveVisited,
    GetLastReminder,
    SaveLastReminder,
    RemoveLastReminder,
}

#[derive(Debug, Default)]
struct Slots {
    current: Option<VenueRecord>,
    visited: Option<Vec<VenueRecord>>,
    last_reminder: Option<DateTime<Utc>>,
    failing: HashSet<StoreOp>,
}

impl Slots {
    fn check(&self, op: StoreOp) -> CheckInResult<()> {
        if self.failing.contains(&op) {
            return Err(CheckInError::storage_unavailable(format!("{:?} failed", op)));
        }
        Ok(())
    }
}

/// Deterministic store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    slots: RwLock<Slots>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `op` fail until [`InMemoryStore::recover`].
    pub async fn fail_on(&self, op: StoreOp) {
        self.slots.write().await.failing.insert(op);
    }

    /// Clear all injected failures.
    pub async fn recover(&self) {
        self.slots.write().await.failing.clear();
    }
}

#[async_trait]
impl VenueRecordRepository for InMemoryStore {
    async fn get_current_venue(&self) -> CheckInResult<Option<VenueRecord>> {
        let slots = self.slots.read().await;
        slots.check(StoreOp::GetCurrent)?;
        Ok(slots.current.clone())
    }

    async fn save_current(&self, current: VenueRecord) -> CheckInResult<VenueRecord> {
        let mut slots = self.slots.write().await;
        slots.check(StoreOp::SaveCurrent)?;
        slots.current = Some(current.clone());
        Ok(current)
    }

    async fn get_visited(&self) -> CheckInResult<Option<Vec<VenueRecord>>> {
        let slots = self.slots.read().await;
        slots.check(StoreOp::GetVisited)?;
        Ok(slots.visited.clone())
    }

    async fn save_visit(&self, visit: VenueRecord) -> CheckInResult<VenueRecord> {
        let mut slots = self.slots.write().await;
        slots.check(StoreOp::GetVisited)?;
        slots.check(StoreOp::SaveVisit)?;
        slots.visited.get_or_insert_with(Vec::new).push(visit.clone());
        Ok(visit)
    }

    async fn remove_current(&self) -> CheckInResult<()> {
        let mut slots = self.slots.write().await;
        slots.check(StoreOp::RemoveCurrent)?;
        slots.current = None;
        Ok(())
    }

    async fn remove_visited(&self) -> CheckInResult<()> {
        let mut slots = self.slots.write().await;
        slots.check(StoreOp::RemoveVisited)?;
        slots.visited = None;
        Ok(())
    }
}

#[async_trait]
impl ReminderRepository for InMemoryStore {
    async fn get_last_reminder(&self) -> CheckInResult<Option<DateTime<Utc>>> {
        let slots = self.slots.read().await;
        slots.check(StoreOp::GetLastReminder)?;
        Ok(slots.last_reminder)
    }

    async fn save_last_reminder(&self, at: DateTime<Utc>) -> CheckInResult<()> {
        let mut slots = self.slots.write().await;
        slots.check(StoreOp::SaveLastReminder)?;
        slots.last_reminder = Some(at);
        Ok(())
    }

    async fn remove_last_reminder(&self) -> CheckInResult<()> {
        let mut slots = self.slots.write().await;
        slots.check(StoreOp::RemoveLastReminder)?;
        slots.last_reminder = None;
        Ok(())
    }
}
