//! Collaborator interfaces
//!
//! The lifecycle engine consumes these but never implements them, so the
//! host decides how notifications are delivered and where "now" comes from.

use chrono::{DateTime, Utc};

use crate::venue::types::AppState;

/// Fires user-facing notifications. Fire-and-forget: delivery failures are
/// the implementation's concern and are never reported back.
pub trait NotificationTrigger {
    fn send_check_in_reminder(&self);

    fn send_exposure_alert(&self);
}

/// Synchronous read of the host application's lifecycle phase
pub trait AppStateObserver {
    fn current_state(&self) -> AppState;
}

/// Source of the current time for every elapsed-time computation
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}
