//! Status-check scheduler.
//!
//! Drives the periodic status-check loop: each tick runs one pass of the
//! lifecycle engine so reminders go out and stale check-ins are closed even
//! when nobody touches the app.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::time;

use crate::venue::{CheckInLifecycleEngine, StatusCheckOutcome};

/// Run the status-check loop.
///
/// Errors from a pass are logged and the loop continues; the next tick is
/// the retry. Runs until `Ctrl+C` (SIGINT) is received.
pub async fn run_status_checks(engine: Arc<CheckInLifecycleEngine>, interval_seconds: u64) {
    let mut interval = time::interval(Duration::from_secs(interval_seconds));
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    let config = engine.config();
    tracing::info!(
        max_check_in_hours = config.max_check_in_hours,
        reminder_interval_hours = config.reminder_interval_hours,
        "Status checks started (interval: {}s)",
        interval_seconds
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                check_once(&engine).await;
            }

            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown signal received. Stopping status checks.");
                break;
            }
        }
    }

    tracing::info!("Status checks stopped cleanly");
}

/// Execute a single pass and log what it did. Extracted for testability.
pub async fn check_once(engine: &CheckInLifecycleEngine) -> Option<StatusCheckOutcome> {
    match engine.check_status().await {
        Ok(outcome) => {
            if let Some(closed) = &outcome.checked_out {
                tracing::info!(
                    "Status check closed check-in at '{}' (reminder sent: {})",
                    closed.name,
                    outcome.reminder_sent
                );
            } else if outcome.reminder_sent {
                tracing::info!("Status check sent a reminder");
            } else {
                tracing::debug!("Status check: nothing due");
            }
            Some(outcome)
        }
        Err(err) => {
            tracing::error!(code = err.error_code(), "Status check failed, retrying next tick: {}", err);
            None
        }
    }
}
