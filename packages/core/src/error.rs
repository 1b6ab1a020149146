use thiserror::Error;

use crate::venue::error::CheckInError;

/// Unified application error.
///
/// Wraps everything that can stop the binary before or while running a
/// command, so `main` fails in one predictable place.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    CheckIn(#[from] CheckInError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

impl AppError {
    /// Process exit status: 2 when a command was refused given the current
    /// check-in state or its input, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::CheckIn(err) if err.is_user_error() => 2,
            _ => 1,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
