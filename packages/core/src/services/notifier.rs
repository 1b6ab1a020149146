//! Notification triggers.
//!
//! Actual delivery (local notifications, push) belongs to the host. The
//! CLI build only logs; the recording notifier counts calls for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::venue::provider::NotificationTrigger;

/// Logs each notification at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationTrigger for TracingNotifier {
    fn send_check_in_reminder(&self) {
        tracing::info!(kind = "check_in_reminder", "Notification: you are still checked in");
    }

    fn send_exposure_alert(&self) {
        tracing::warn!(kind = "exposure_alert", "Notification: possible exposure at a visited venue");
    }
}

/// Counts notifications instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    reminders: AtomicUsize,
    exposure_alerts: AtomicUsize,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reminders_sent(&self) -> usize {
        self.reminders.load(Ordering::SeqCst)
    }

    pub fn exposure_alerts_sent(&self) -> usize {
        self.exposure_alerts.load(Ordering::SeqCst)
    }
}

impl NotificationTrigger for RecordingNotifier {
    fn send_check_in_reminder(&self) {
        self.reminders.fetch_add(1, Ordering::SeqCst);
    }

    fn send_exposure_alert(&self) {
        self.exposure_alerts.fetch_add(1, Ordering::SeqCst);
    }
}
