//! Query handlers for the Session & Progress context.
//!
//! Read-only views over the session store. They never create sessions.

use chrono::{DateTime, Utc};
use sagaforge_character::Player;
use sagaforge_core::error::DomainError;
use sagaforge_core::id::SessionId;
use sagaforge_core::repository::StoredSnapshot;
use sagaforge_narrative::{Message, Outcome, StoryOutline};
use sagaforge_world::World;
use serde::Serialize;
use uuid::Uuid;

use crate::application::store::SessionStore;
use crate::domain::state::{SessionPhase, SessionState};

/// Read-only view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: SessionId,
    /// Lifecycle phase.
    pub phase: SessionPhase,
    /// Selected world.
    pub world: Option<World>,
    /// The party, in turn order.
    pub players: Vec<Player>,
    /// Index of the player expected to act next.
    pub active_index: usize,
    /// Current party goal.
    pub goal: Option<String>,
    /// Quest progress entries.
    pub quest_log: Vec<String>,
    /// Whether the session has ended.
    pub is_over: bool,
    /// Verdict.
    pub outcome: Outcome,
    /// Full transcript, oldest first.
    pub messages: Vec<Message>,
    /// Story outline, if one was generated.
    pub story: Option<StoryOutline>,
    /// Number of resolved turns.
    pub turn_count: u32,
    /// When the session was (re)started.
    pub created_at: DateTime<Utc>,
    /// When the session last changed.
    pub updated_at: DateTime<Utc>,
}

impl From<SessionState> for SessionView {
    fn from(state: SessionState) -> Self {
        Self {
            session_id: state.session_id,
            phase: state.phase,
            world: state.world,
            players: state.players,
            active_index: state.active_index,
            goal: state.goal,
            quest_log: state.quest_log,
            is_over: state.is_over,
            outcome: state.outcome,
            messages: state.messages,
            story: state.story,
            turn_count: state.turn_count,
            created_at: state.created_at,
            updated_at: state.updated_at,
        }
    }
}

/// Listing entry for a saved snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    /// Snapshot identifier, used to restore it.
    pub snapshot_id: Uuid,
    /// Player-facing save name.
    pub name: String,
    /// When the save was taken.
    pub saved_at: DateTime<Utc>,
}

impl From<&StoredSnapshot> for SnapshotSummary {
    fn from(snapshot: &StoredSnapshot) -> Self {
        Self {
            snapshot_id: snapshot.snapshot_id,
            name: snapshot.name.clone(),
            saved_at: snapshot.saved_at,
        }
    }
}

/// Retrieves the current state of a session.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if the session was never started.
/// Returns `DomainError::Infrastructure` if the repository fails.
pub async fn get_session(
    session_id: &SessionId,
    store: &SessionStore,
) -> Result<SessionView, DomainError> {
    store
        .snapshot(session_id)
        .await?
        .map(SessionView::from)
        .ok_or_else(|| DomainError::SessionNotFound(session_id.to_string()))
}

/// Lists a session's saved snapshots, most recent first.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the repository fails.
pub async fn list_snapshots(
    session_id: &SessionId,
    store: &SessionStore,
) -> Result<Vec<SnapshotSummary>, DomainError> {
    Ok(store
        .list_snapshots(session_id)
        .await?
        .iter()
        .map(SnapshotSummary::from)
        .collect())
}
