use std::env;

use crate::venue::config::{
    CheckInConfig, DEFAULT_MAX_CHECK_IN_HOURS, DEFAULT_REMINDER_INTERVAL_HOURS,
};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://venue_checkin.db";
pub const DEFAULT_STATUS_CHECK_INTERVAL_SECONDS: u64 = 300;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub check_in: CheckInConfig,
    pub status_check_interval_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            check_in: CheckInConfig::default(),
            status_check_interval_seconds: DEFAULT_STATUS_CHECK_INTERVAL_SECONDS,
        }
    }
}

impl Config {
    /// Every variable is optional; unset means the default.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let max_check_in_hours = positive(
            &lookup,
            "MAX_CHECK_IN_HOURS",
            u64::from(DEFAULT_MAX_CHECK_IN_HOURS),
        )?;
        let reminder_interval_hours = positive(
            &lookup,
            "REMINDER_INTERVAL_HOURS",
            u64::from(DEFAULT_REMINDER_INTERVAL_HOURS),
        )?;
        let status_check_interval_seconds = positive(
            &lookup,
            "STATUS_CHECK_INTERVAL_SECONDS",
            DEFAULT_STATUS_CHECK_INTERVAL_SECONDS,
        )?;

        Ok(Self {
            database_url,
            check_in: CheckInConfig {
                max_check_in_hours: to_hours(max_check_in_hours, "MAX_CHECK_IN_HOURS")?,
                reminder_interval_hours: to_hours(reminder_interval_hours, "REMINDER_INTERVAL_HOURS")?,
            },
            status_check_interval_seconds,
        })
    }
}

fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64, String> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) => Err(format!("{} must be greater than zero", key)),
            Ok(value) => Ok(value),
            Err(_) => Err(format!("{} must be a valid number", key)),
        },
    }
}

fn to_hours(value: u64, key: &str) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("{} is too large", key))
}
