//! Check-In Lifecycle Engine - reminder and auto-checkout decisions

use chrono::{DateTime, Duration, Utc};

use crate::venue::{
    config::CheckInConfig,
    error::{CheckInError, CheckInResult},
    types::{AppState, StatusCheckOutcome, VenueRecord},
    Collaborators,
};

/// Decides, on each status-check pass, whether the open check-in warrants a
/// reminder and whether it should be closed automatically.
///
/// Holds no state of its own beyond its configuration; everything else is
/// read from the collaborators on every pass.
pub struct CheckInLifecycleEngine {
    config: CheckInConfig,
    deps: Collaborators,
}

impl CheckInLifecycleEngine {
    pub fn new(config: CheckInConfig, deps: Collaborators) -> Self {
        Self { config, deps }
    }

    pub fn config(&self) -> &CheckInConfig {
        &self.config
    }

    /// Run one status-check pass.
    ///
    /// 1. No open check-in: nothing to do.
    /// 2. Send a reminder if one is due, whatever the app state, and record
    ///    when it was sent.
    /// 3. Close the check-in if the app is not active and it has been open
    ///    longer than `max_check_in_hours`.
    ///
    /// The reminder is evaluated on the record as it was before any
    /// checkout, so both can happen in the same pass. Store failures are
    /// returned unchanged; the next pass retries from whatever state is left.
    pub async fn check_status(&self) -> CheckInResult<StatusCheckOutcome> {
        let _guard = self.deps.lock.acquire().await;

        let Some(current) = self.deps.venues.get_current_venue().await? else {
            tracing::debug!("Status check: no open check-in");
            return Ok(StatusCheckOutcome::default());
        };

        let now = self.deps.clock.now();
        let reminder_sent = self.send_reminder_if_due(&current, now).await?;
        let checked_out = self.auto_check_out_if_due(current, now).await?;

        Ok(StatusCheckOutcome {
            reminder_sent,
            checked_out,
        })
    }

    /// Reminder policy.
    ///
    /// Without a previous reminder the check-in time is the reference;
    /// once a reminder has been sent only its timestamp counts.
    pub fn should_remind(
        &self,
        venue: &VenueRecord,
        last_reminder: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        let since = last_reminder.unwrap_or(venue.check_in);
        is_outdated(since, self.config.reminder_interval(), now)
    }

    /// Auto-checkout policy: never while the app is in the foreground.
    pub fn should_auto_check_out(
        &self,
        venue: &VenueRecord,
        state: AppState,
        now: DateTime<Utc>,
    ) -> bool {
        !state.is_active() && is_outdated(venue.check_in, self.config.max_check_in(), now)
    }

    async fn send_reminder_if_due(
        &self,
        venue: &VenueRecord,
        now: DateTime<Utc>,
    ) -> CheckInResult<bool> {
        let last_reminder = self.deps.reminders.get_last_reminder().await?;
        if !self.should_remind(venue, last_reminder, now) {
            return Ok(false);
        }

        self.deps.notifier.send_check_in_reminder();
        self.deps.reminders.save_last_reminder(now).await?;

        tracing::info!(
            venue = %venue.name,
            checked_in = %venue.check_in,
            previous_reminder = ?last_reminder,
            "Check-in reminder sent"
        );
        Ok(true)
    }

    async fn auto_check_out_if_due(
        &self,
        venue: VenueRecord,
        now: DateTime<Utc>,
    ) -> CheckInResult<Option<VenueRecord>> {
        let state = self.deps.app_state.current_state();
        if !self.should_auto_check_out(&venue, state, now) {
            return Ok(None);
        }

        let closed = match self.deps.venues.check_out(venue.closed_at(now)).await {
            Ok(closed) => closed,
            Err(CheckInError::NoOpenCheckIn) => {
                tracing::info!("Check-in was closed elsewhere during the status check");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        tracing::info!(
            venue = %closed.name,
            checked_in = %closed.check_in,
            app_state = ?state,
            "Auto checkout after {}h",
            self.config.max_check_in_hours
        );
        Ok(Some(closed))
    }
}

/// `true` when strictly more than `interval` has passed since `since`.
pub fn is_outdated(since: DateTime<Utc>, interval: Duration, now: DateTime<Utc>) -> bool {
    now - since > interval
}
