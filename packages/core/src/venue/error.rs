//! Error types for check-in lifecycle operations

use thiserror::Error;

/// Errors surfaced by the store, the lifecycle engine and the command surface
#[derive(Error, Debug)]
pub enum CheckInError {
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("No open check-in")]
    NoOpenCheckIn,

    #[error("Already checked in at '{venue}'; check out first")]
    AlreadyCheckedIn { venue: String },

    #[error("Invalid venue: {message}")]
    InvalidVenue { message: String },
}

impl CheckInError {
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable { message: message.into() }
    }

    pub fn invalid_venue(message: impl Into<String>) -> Self {
        Self::InvalidVenue { message: message.into() }
    }

    /// `true` when the underlying persistence failed and a later retry may succeed.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }

    /// `true` when the request itself was refused given the current state.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NoOpenCheckIn | Self::AlreadyCheckedIn { .. } | Self::InvalidVenue { .. }
        )
    }

    /// Machine-readable code, stable across message wording changes.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::StorageUnavailable { .. } => "STORAGE_UNAVAILABLE",
            Self::NoOpenCheckIn => "NO_OPEN_CHECK_IN",
            Self::AlreadyCheckedIn { .. } => "ALREADY_CHECKED_IN",
            Self::InvalidVenue { .. } => "INVALID_VENUE",
        }
    }
}

impl From<sqlx::Error> for CheckInError {
    fn from(err: sqlx::Error) -> Self {
        Self::storage_unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for CheckInError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage_unavailable(format!("corrupt slot value: {}", err))
    }
}

/// Result type for check-in operations
pub type CheckInResult<T> = Result<T, CheckInError>;
