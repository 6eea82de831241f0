//! Collaborator error types.
//!
//! These are kept cloneable so the owning subsystem can hold its last
//! error while still returning it to the caller.

use thiserror::Error;

/// Errors from the settings store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("settings record invalid, defaults restored")]
    InvalidRecord,

    #[error("settings io: {0}")]
    Io(String),

    #[error("settings encoding: {0}")]
    Encoding(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

/// Errors from the clock.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("time adjustment out of range")]
    AdjustOutOfRange,
}

/// Errors from the display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    #[error("display io: {0}")]
    Io(String),
}

impl From<std::io::Error> for DisplayError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
