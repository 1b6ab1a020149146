//! Check-In Command Surface - user-initiated check-in, check-out and cancel

use crate::venue::{
    error::{CheckInError, CheckInResult},
    types::{VenueInfo, VenueRecord},
    Collaborators,
};

/// Operations the UI layer calls in response to user actions.
///
/// Each mutating call is one logical transaction for the caller and holds
/// the lifecycle lock while it runs. A failure part-way through is returned
/// as is; nothing is retried or rolled back here.
pub struct CheckInService {
    deps: Collaborators,
}

impl CheckInService {
    pub fn new(deps: Collaborators) -> Self {
        Self { deps }
    }

    /// Check in at a freshly scanned venue.
    ///
    /// Refuses with `AlreadyCheckedIn` while another check-in is open, also
    /// when another process opens one between the check and the insert. The
    /// reminder slot is cleared so the new check-in gets its own cadence.
    pub async fn start_check_in(&self, venue: VenueInfo) -> CheckInResult<VenueRecord> {
        let venue = venue.validated()?;
        let _guard = self.deps.lock.acquire().await;

        if let Some(open) = self.deps.venues.get_current_venue().await? {
            return Err(CheckInError::AlreadyCheckedIn { venue: open.name });
        }

        self.deps.reminders.remove_last_reminder().await?;
        let record = VenueRecord::open(venue, self.deps.clock.now());
        let saved = self.deps.venues.open_check_in(record).await?;

        tracing::info!(venue = %saved.name, venue_id = %saved.id, "Checked in");
        Ok(saved)
    }

    /// Close the open check-in now and move it into the history.
    pub async fn confirm_check_out(&self) -> CheckInResult<VenueRecord> {
        let _guard = self.deps.lock.acquire().await;

        let current = self
            .deps
            .venues
            .get_current_venue()
            .await?
            .ok_or(CheckInError::NoOpenCheckIn)?;

        let closed = current.closed_at(self.deps.clock.now());
        let closed = self.deps.venues.check_out(closed).await?;

        tracing::info!(venue = %closed.name, "Checked out");
        Ok(closed)
    }

    /// Drop the open check-in without recording a visit.
    pub async fn cancel_check_in(&self) -> CheckInResult<()> {
        let _guard = self.deps.lock.acquire().await;

        let current = self
            .deps
            .venues
            .get_current_venue()
            .await?
            .ok_or(CheckInError::NoOpenCheckIn)?;

        self.deps.venues.remove_current().await?;

        tracing::info!(venue = %current.name, "Check-in cancelled");
        Ok(())
    }

    pub async fn get_current_venue(&self) -> CheckInResult<Option<VenueRecord>> {
        self.deps.venues.get_current_venue().await
    }

    /// Visited history, oldest first; empty if nothing was ever recorded.
    pub async fn get_visited(&self) -> CheckInResult<Vec<VenueRecord>> {
        Ok(self.deps.venues.get_visited().await?.unwrap_or_default())
    }

    pub async fn clear_history(&self) -> CheckInResult<()> {
        let _guard = self.deps.lock.acquire().await;
        self.deps.venues.remove_visited().await?;
        tracing::info!("Visit history cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    use crate::repository::{ReminderRepository, VenueRecordRepository};
    use crate::services::{AppStateHandle, ManualClock, RecordingNotifier};
    use crate::store::{InMemoryStore, StoreOp};
    use crate::venue::{AppState, LifecycleLock};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 1, 8, 0, 0).unwrap()
    }

    fn make_service() -> (CheckInService, Arc<InMemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let deps = Collaborators {
            venues: store.clone(),
            reminders: store.clone(),
            notifier: Arc::new(RecordingNotifier::new()),
            app_state: Arc::new(AppStateHandle::new(AppState::Active)),
            clock: clock.clone(),
            lock: LifecycleLock::new(),
        };
        (CheckInService::new(deps), store, clock)
    }

    fn bar() -> VenueInfo {
        VenueInfo::new("qr-bar-pepe", "Bar Pepe")
    }

    // ---- start_check_in ----

    #[tokio::test]
    async fn start_check_in_opens_record_at_now() {
        let (service, _, _) = make_service();

        let record = service.start_check_in(bar()).await.unwrap();

        assert!(record.is_open());
        assert_eq!(record.check_in, t0());
        assert_eq!(service.get_current_venue().await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn start_check_in_refuses_second_open_record() {
        let (service, _, _) = make_service();
        service.start_check_in(bar()).await.unwrap();

        let err = service
            .start_check_in(VenueInfo::new("qr-cafe", "Cafe"))
            .await
            .unwrap_err();

        assert!(matches!(err, CheckInError::AlreadyCheckedIn { ref venue } if venue == "Bar Pepe"));
        assert_eq!(service.get_current_venue().await.unwrap().unwrap().name, "Bar Pepe");
    }

    #[tokio::test]
    async fn start_check_in_rejects_blank_venue() {
        let (service, store, _) = make_service();

        let err = service.start_check_in(VenueInfo::new("qr", "  ")).await.unwrap_err();

        assert!(matches!(err, CheckInError::InvalidVenue { .. }));
        assert!(store.get_current_venue().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn start_check_in_resets_reminder_cadence() {
        let (service, store, _) = make_service();
        store.save_last_reminder(t0() - Duration::hours(1)).await.unwrap();

        service.start_check_in(bar()).await.unwrap();

        assert!(store.get_last_reminder().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn start_check_in_surfaces_failed_save_after_reminder_reset() {
        let (service, store, _) = make_service();
        store.save_last_reminder(t0() - Duration::hours(1)).await.unwrap();
        store.fail_on(StoreOp::SaveCurrent).await;

        let err = service.start_check_in(bar()).await.unwrap_err();

        assert!(err.is_storage_error());
        store.recover().await;
        assert!(store.get_last_reminder().await.unwrap().is_none());
        assert!(store.get_current_venue().await.unwrap().is_none());
    }

    // ---- confirm_check_out ----

    #[tokio::test]
    async fn confirm_check_out_moves_record_to_history() {
        let (service, _, clock) = make_service();
        service.start_check_in(bar()).await.unwrap();
        clock.advance(Duration::minutes(45));

        let closed = service.confirm_check_out().await.unwrap();

        assert_eq!(closed.check_out, Some(t0() + Duration::minutes(45)));
        assert!(service.get_current_venue().await.unwrap().is_none());
        assert_eq!(service.get_visited().await.unwrap(), vec![closed]);
    }

    #[tokio::test]
    async fn confirm_check_out_without_open_record_fails() {
        let (service, _, _) = make_service();

        let err = service.confirm_check_out().await.unwrap_err();

        assert!(matches!(err, CheckInError::NoOpenCheckIn));
    }

    #[tokio::test]
    async fn confirm_check_out_surfaces_partial_failure() {
        let (service, store, _) = make_service();
        service.start_check_in(bar()).await.unwrap();
        store.fail_on(StoreOp::SaveVisit).await;

        let err = service.confirm_check_out().await.unwrap_err();

        assert!(err.is_storage_error());
        store.recover().await;
        assert!(service.get_current_venue().await.unwrap().is_none());
        assert!(service.get_visited().await.unwrap().is_empty());
    }

    // ---- cancel_check_in ----

    #[tokio::test]
    async fn cancel_check_in_does_not_record_a_visit() {
        let (service, _, _) = make_service();
        service.start_check_in(bar()).await.unwrap();

        service.cancel_check_in().await.unwrap();

        assert!(service.get_current_venue().await.unwrap().is_none());
        assert!(service.get_visited().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_check_in_without_open_record_fails() {
        let (service, _, _) = make_service();
        assert!(matches!(
            service.cancel_check_in().await.unwrap_err(),
            CheckInError::NoOpenCheckIn
        ));
    }

    // ---- history ----

    #[tokio::test]
    async fn clear_history_empties_visits() {
        let (service, _, _) = make_service();
        service.start_check_in(bar()).await.unwrap();
        service.confirm_check_out().await.unwrap();

        service.clear_history().await.unwrap();

        assert!(service.get_visited().await.unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn history_keeps_every_visit_in_order(durations in prop::collection::vec(0i64..600, 1..8)) {
            let (service, _, clock) = make_service();

            let visited = tokio_test::block_on(async {
                for (i, minutes) in durations.iter().enumerate() {
                    let venue = VenueInfo::new(format!("qr-{}", i), format!("Venue {}", i));
                    service.start_check_in(venue).await.unwrap();
                    clock.advance(Duration::minutes(*minutes));
                    service.confirm_check_out().await.unwrap();
                }
                service.get_visited().await.unwrap()
            });

            prop_assert_eq!(visited.len(), durations.len());
            for (i, (record, minutes)) in visited.iter().zip(&durations).enumerate() {
                prop_assert_eq!(&record.id, &format!("qr-{}", i));
                prop_assert_eq!(record.elapsed(Utc::now()), Duration::minutes(*minutes));
            }
        }
    }
}
