//! Error types for confsync.

use chrono::NaiveDate;
use thiserror::Error;

use crate::event::RemoteId;

/// Errors that can occur while reconciling a calendar.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Malformed input: {0}")]
    MalformedInput(#[from] MalformedInput),

    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Remote event '{0}' no longer exists")]
    StaleIdentifier(RemoteId),

    #[error("Invalid event: {0}")]
    InvalidEvent(#[from] InvalidEvent),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Why a source file was rejected. The whole parse fails on the first one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedInput {
    #[error("expected header {expected:?} but got {actual:?}")]
    Header {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("line {line}: {reason}")]
    Row { line: u64, reason: String },
}

/// Violations of the event invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidEvent {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

/// Result type alias for confsync operations.
pub type SyncResult<T> = Result<T, SyncError>;
