//! Core data types for venue check-ins

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::venue::error::{CheckInError, CheckInResult};

/// Result of scanning a venue code, before a check-in exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueInfo {
    pub id: String,
    pub name: String,
}

impl VenueInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Reject scans with a blank identifier or name; trims both otherwise.
    pub fn validated(self) -> CheckInResult<Self> {
        let id = self.id.trim();
        let name = self.name.trim();
        if id.is_empty() {
            return Err(CheckInError::invalid_venue("venue identifier is empty"));
        }
        if name.is_empty() {
            return Err(CheckInError::invalid_venue("venue name is empty"));
        }
        Ok(Self::new(id, name))
    }
}

/// A single check-in event.
///
/// A record without `check_out` is open; closing it moves it from the
/// current slot into the visited history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRecord {
    pub id: String,
    pub name: String,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
}

impl VenueRecord {
    pub fn open(venue: VenueInfo, check_in: DateTime<Utc>) -> Self {
        Self {
            id: venue.id,
            name: venue.name,
            check_in,
            check_out: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }

    /// Same venue scanned at the same instant, open or closed.
    pub fn is_same_check_in(&self, other: &VenueRecord) -> bool {
        self.id == other.id && self.check_in == other.check_in
    }

    /// Close the record at `at`. Never stamps a check-out earlier than the
    /// check-in, so a clock that stepped backwards still yields a valid record.
    pub fn closed_at(mut self, at: DateTime<Utc>) -> Self {
        self.check_out = Some(at.max(self.check_in));
        self
    }

    /// Time spent at the venue so far, zero if `now` precedes the check-in.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let end = self.check_out.unwrap_or(now);
        (end - self.check_in).max(Duration::zero())
    }
}

/// Render a duration as `HH:MM`, hours unbounded.
pub fn format_elapsed(elapsed: Duration) -> String {
    let minutes = elapsed.num_minutes().max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Lifecycle phase of the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    Active,
    Inactive,
    Background,
}

impl AppState {
    pub fn is_active(self) -> bool {
        self == AppState::Active
    }
}

impl std::str::FromStr for AppState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(AppState::Active),
            "inactive" => Ok(AppState::Inactive),
            "background" => Ok(AppState::Background),
            other => Err(format!("Invalid app state: {}", other)),
        }
    }
}

/// What a single status-check pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCheckOutcome {
    pub reminder_sent: bool,
    pub checked_out: Option<VenueRecord>,
}

impl StatusCheckOutcome {
    pub fn is_noop(&self) -> bool {
        !self.reminder_sent && self.checked_out.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn validated_trims_and_accepts() {
        let venue = VenueInfo::new("  qr-123 ", " Bar Pepe ").validated().unwrap();
        assert_eq!(venue.id, "qr-123");
        assert_eq!(venue.name, "Bar Pepe");
    }

    #[test]
    fn validated_rejects_blank_fields() {
        assert!(VenueInfo::new("", "Bar").validated().is_err());
        assert!(VenueInfo::new("qr-1", "   ").validated().is_err());
    }

    #[test]
    fn new_record_is_open() {
        let record = VenueRecord::open(VenueInfo::new("qr", "Bar"), at(10, 0));
        assert!(record.is_open());
    }

    #[test]
    fn closed_at_never_precedes_check_in() {
        let record = VenueRecord::open(VenueInfo::new("qr", "Bar"), at(10, 0));
        let closed = record.closed_at(at(9, 0));
        assert_eq!(closed.check_out, Some(at(10, 0)));
        assert!(!closed.is_open());
    }

    #[test]
    fn elapsed_uses_check_out_when_closed() {
        let record = VenueRecord::open(VenueInfo::new("qr", "Bar"), at(10, 0)).closed_at(at(11, 30));
        assert_eq!(record.elapsed(at(20, 0)), Duration::minutes(90));
    }

    #[test]
    fn closing_keeps_check_in_identity() {
        let open = VenueRecord::open(VenueInfo::new("qr", "Bar"), at(10, 0));
        let closed = open.clone().closed_at(at(11, 0));
        let later = VenueRecord::open(VenueInfo::new("qr", "Bar"), at(12, 0));

        assert!(closed.is_same_check_in(&open));
        assert!(!later.is_same_check_in(&open));
    }

    #[test]
    fn elapsed_is_clamped_at_zero() {
        let record = VenueRecord::open(VenueInfo::new("qr", "Bar"), at(10, 0));
        assert_eq!(record.elapsed(at(9, 0)), Duration::zero());
    }

    #[test]
    fn format_elapsed_pads_hours_and_minutes() {
        assert_eq!(format_elapsed(Duration::minutes(5)), "00:05");
        assert_eq!(format_elapsed(Duration::minutes(125)), "02:05");
        assert_eq!(format_elapsed(Duration::hours(30)), "30:00");
    }

    #[test]
    fn app_state_parses_case_insensitively() {
        assert_eq!("Background".parse::<AppState>(), Ok(AppState::Background));
        assert_eq!("active".parse::<AppState>(), Ok(AppState::Active));
        assert!("asleep".parse::<AppState>().is_err());
    }

    #[test]
    fn record_serializes_with_optional_check_out() {
        let record = VenueRecord::open(VenueInfo::new("qr", "Bar"), at(10, 0));
        let json = serde_json::to_string(&record).unwrap();
        let back: VenueRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert!(json.contains("\"check_out\":null"));
    }
}
