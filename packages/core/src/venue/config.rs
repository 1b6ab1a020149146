//! Configuration for the check-in lifecycle engine

use chrono::Duration;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_CHECK_IN_HOURS: u32 = 6;
pub const DEFAULT_REMINDER_INTERVAL_HOURS: u32 = 3;

/// Thresholds driving reminders and auto-checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInConfig {
    /// An open check-in older than this is closed automatically while the
    /// app is not in the foreground.
    pub max_check_in_hours: u32,
    /// Minimum spacing between two check-in reminders.
    pub reminder_interval_hours: u32,
}

impl CheckInConfig {
    pub fn max_check_in(&self) -> Duration {
        Duration::hours(i64::from(self.max_check_in_hours))
    }

    pub fn reminder_interval(&self) -> Duration {
        Duration::hours(i64::from(self.reminder_interval_hours))
    }
}

impl Default for CheckInConfig {
    fn default() -> Self {
        Self {
            max_check_in_hours: DEFAULT_MAX_CHECK_IN_HOURS,
            reminder_interval_hours: DEFAULT_REMINDER_INTERVAL_HOURS,
        }
    }
}
