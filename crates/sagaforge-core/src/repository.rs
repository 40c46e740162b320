//! Durable session store abstraction.
//!
//! The core only needs get/set semantics keyed by session identifier plus a
//! bounded, most-recent-first list of named save snapshots. Payloads are
//! opaque JSON documents; the session context owns their shape.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::id::SessionId;

/// Maximum number of save snapshots retained per session.
pub const MAX_SNAPSHOTS: usize = 10;

/// Stored representation of a session's current state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    /// Session this document belongs to.
    pub session_id: SessionId,
    /// Serialized session state.
    pub payload: serde_json::Value,
    /// Number of commits applied to this session.
    pub version: i64,
    /// Timestamp of the last write.
    pub saved_at: DateTime<Utc>,
}

/// A named copy of a session's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSnapshot {
    /// Unique snapshot identifier.
    pub snapshot_id: Uuid,
    /// Session the snapshot was taken from.
    pub session_id: SessionId,
    /// Player-facing save name.
    pub name: String,
    /// Serialized session state at save time.
    pub payload: serde_json::Value,
    /// Timestamp of the save.
    pub saved_at: DateTime<Utc>,
}

/// Repository trait for loading and persisting sessions and their snapshots.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Load the current state of a session, if any was ever saved.
    async fn load_session(&self, session_id: &SessionId)
    -> Result<Option<StoredSession>, DomainError>;

    /// Overwrite the current state of a session.
    async fn save_session(&self, session: &StoredSession) -> Result<(), DomainError>;

    /// Record a snapshot. Implementations keep the list most-recent-first and
    /// truncate it to [`MAX_SNAPSHOTS`].
    async fn push_snapshot(&self, snapshot: &StoredSnapshot) -> Result<(), DomainError>;

    /// List a session's snapshots, most recent first.
    async fn list_snapshots(&self, session_id: &SessionId)
    -> Result<Vec<StoredSnapshot>, DomainError>;
}

/// Inserts `snapshot` at the front of `snapshots` and drops the oldest
/// entries beyond [`MAX_SNAPSHOTS`].
pub fn push_bounded(snapshots: &mut Vec<StoredSnapshot>, snapshot: StoredSnapshot) {
    snapshots.insert(0, snapshot);
    snapshots.truncate(MAX_SNAPSHOTS);
}
