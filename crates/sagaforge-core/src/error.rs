//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
///
/// Malformed narrator output is never represented here: it degrades to a
/// turn without effects.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No state exists for the session identifier.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// No save snapshot with this identifier exists for the session.
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(Uuid),

    /// The requested world is not in the catalog.
    #[error("world not found: {0}")]
    WorldNotFound(String),

    /// The caller supplied input the session cannot accept in its current
    /// phase (bad player index, blank action, wrong phase, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// The narrator or outline collaborator failed or timed out.
    #[error("narrator unavailable: {0}")]
    NarratorUnavailable(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
