//! Error types for the synchronization core
//!
//! Most failure modes here are benign and get clamped or skipped at the point
//! where they occur. Only `SaveFailed` ever reaches the user, and then only as
//! a non-blocking notice.

use thiserror::Error;

/// Top-level error taxonomy
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// Offset outside the text bounds (always clamped, never surfaced)
    #[error("offset {offset} out of range (len {len})")]
    MappingOutOfRange { offset: usize, len: usize },

    /// Cursor restoration skipped because local typing is in progress
    #[error("cursor restoration skipped: local typing in progress")]
    RestorationSkipped,

    /// Persistence call failed; the dirty flag is retained
    #[error("save failed: {0}")]
    SaveFailed(#[from] PersistError),

    /// Structural markers could not be parsed
    #[error("projection failed: {0}")]
    Projection(#[from] ProjectionError),
}

/// Malformed structural marker errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// A line opens a marker with `[[` but never closes it
    #[error("unterminated structural marker on line {line}")]
    UnterminatedMarker { line: usize },

    /// The marker has no `kind:` part
    #[error("structural marker on line {line} has no kind")]
    EmptyMarkerKind { line: usize },
}

/// Typed failure returned by a persistence sink
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("network error: {0}")]
    Network(String),

    #[error("rejected by server ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("payload serialization failed: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
