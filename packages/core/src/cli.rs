use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::venue::AppState;

/// Venue check-in CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "venue-checkin",
    version,
    about = "Venue check-ins with reminders and automatic check-out"
)]
pub struct Cli {
    /// SQLite database URL
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Hours after which an open check-in is closed automatically
    #[arg(long, global = true)]
    pub max_check_in_hours: Option<u32>,

    /// Minimum hours between two check-in reminders
    #[arg(long, global = true)]
    pub reminder_interval_hours: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check in at a scanned venue
    CheckIn {
        /// Identifier encoded in the venue's code
        #[arg(long)]
        venue_id: String,
        /// Venue display name
        #[arg(long)]
        name: String,
    },
    /// Check out of the current venue
    CheckOut,
    /// Cancel the current check-in without recording a visit
    Cancel,
    /// Show the current check-in
    Status,
    /// List visited venues
    History,
    /// Delete the visit history
    ClearHistory,
    /// Run a single status check
    Check {
        #[arg(long, default_value = "background")]
        app_state: AppState,
    },
    /// Run status checks periodically until Ctrl+C
    Run {
        #[arg(long, default_value = "background")]
        app_state: AppState,
        /// Seconds between status checks
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Fire an exposure alert notification
    NotifyExposure,
}

impl Cli {
    /// Flags win over environment values.
    pub fn apply_overrides(&self, mut config: Config) -> Result<Config, String> {
        if let Some(url) = &self.database_url {
            config.database_url = url.clone();
        }
        if let Some(hours) = self.max_check_in_hours {
            config.check_in.max_check_in_hours = non_zero(hours, "--max-check-in-hours")?;
        }
        if let Some(hours) = self.reminder_interval_hours {
            config.check_in.reminder_interval_hours = non_zero(hours, "--reminder-interval-hours")?;
        }
        if let Command::Run { interval: Some(seconds), .. } = self.command {
            config.status_check_interval_seconds = non_zero(seconds, "--interval")?;
        }
        Ok(config)
    }
}

fn non_zero<T: PartialEq + Default>(value: T, flag: &str) -> Result<T, String> {
    if value == T::default() {
        return Err(format!("{} must be greater than zero", flag));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_in() {
        let cli = Cli::parse_from([
            "venue-checkin",
            "check-in",
            "--venue-id",
            "qr-1",
            "--name",
            "Bar Pepe",
        ]);
        match cli.command {
            Command::CheckIn { venue_id, name } => {
                assert_eq!(venue_id, "qr-1");
                assert_eq!(name, "Bar Pepe");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn check_defaults_to_background() {
        let cli = Cli::parse_from(["venue-checkin", "check"]);
        assert!(matches!(cli.command, Command::Check { app_state: AppState::Background }));
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "venue-checkin",
            "--max-check-in-hours",
            "4",
            "run",
            "--interval",
            "30",
        ]);
        let config = cli.apply_overrides(Config::default()).unwrap();
        assert_eq!(config.check_in.max_check_in_hours, 4);
        assert_eq!(config.check_in.reminder_interval_hours, 3);
        assert_eq!(config.status_check_interval_seconds, 30);
    }

    #[test]
    fn zero_override_is_rejected() {
        let cli = Cli::parse_from(["venue-checkin", "--reminder-interval-hours", "0", "status"]);
        assert!(cli.apply_overrides(Config::default()).is_err());
    }
}
