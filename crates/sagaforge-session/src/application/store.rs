//! Session store with per-session mutual exclusion.
//!
//! Each session id maps to its own async mutex. A [`SessionGuard`] holds
//! that mutex for the whole read, narrate and commit sequence of a turn,
//! so two turns for the same session never interleave while turns for
//! different sessions proceed independently. The id-to-cell map is behind
//! a plain mutex that is only held to look a cell up, never across an
//! await. A cell that ends up holding no session is evicted when its last
//! guard is dropped, so lookups of unknown ids leave the map as they found
//! it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use sagaforge_core::error::DomainError;
use sagaforge_core::id::SessionId;
use sagaforge_core::repository::{SessionRepository, StoredSession, StoredSnapshot};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use crate::domain::state::SessionState;

#[derive(Debug)]
struct Cached {
    state: SessionState,
    version: i64,
}

type Cell = Arc<tokio::sync::Mutex<Option<Cached>>>;
type CellMap = Arc<Mutex<HashMap<SessionId, Cell>>>;

/// Process-level registry of live sessions, backed by a durable repository.
pub struct SessionStore {
    repository: Arc<dyn SessionRepository>,
    cells: CellMap,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Creates a store that writes through to `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self {
            repository,
            cells: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn cell(&self, session_id: &SessionId) -> Result<Cell, DomainError> {
        let mut cells = self
            .cells
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("session map poisoned: {e}")))?;
        Ok(Arc::clone(cells.entry(session_id.clone()).or_default()))
    }

    /// Acquires exclusive access to a session, loading it from the
    /// repository on first use. Waits while another guard for the same
    /// session is alive.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the repository fails or the
    /// stored document cannot be decoded.
    pub async fn lock(&self, session_id: &SessionId) -> Result<SessionGuard, DomainError> {
        let cell = self.cell(session_id)?;
        let slot = Arc::clone(&cell).lock_owned().await;
        let mut guard = SessionGuard {
            session_id: session_id.clone(),
            slot,
            cell,
            cells: Arc::clone(&self.cells),
            repository: Arc::clone(&self.repository),
        };
        if guard.slot.is_none() {
            *guard.slot = self.load(session_id).await?;
        }
        Ok(guard)
    }

    #[cfg(test)]
    fn live_cells(&self) -> usize {
        self.cells.lock().map_or(0, |cells| cells.len())
    }

    async fn load(&self, session_id: &SessionId) -> Result<Option<Cached>, DomainError> {
        let Some(stored) = self.repository.load_session(session_id).await? else {
            return Ok(None);
        };
        let state: SessionState = serde_json::from_value(stored.payload).map_err(|e| {
            DomainError::Infrastructure(format!("session deserialization failed: {e}"))
        })?;
        debug!(%session_id, version = stored.version, "session loaded from repository");
        Ok(Some(Cached {
            state,
            version: stored.version,
        }))
    }

    /// Returns the session, creating and persisting a fresh one if none exists.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the repository fails.
    pub async fn get_or_create(
        &self,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<SessionState, DomainError> {
        let guard = self.lock(session_id).await?;
        if let Some(state) = guard.state() {
            return Ok(state.clone());
        }
        guard
            .commit(SessionState::new(session_id.clone(), now))
            .await
    }

    /// Replaces the session with a fresh one, whatever its current state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the repository fails.
    pub async fn reset(
        &self,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<SessionState, DomainError> {
        let guard = self.lock(session_id).await?;
        guard
            .commit(SessionState::new(session_id.clone(), now))
            .await
    }

    /// Returns a copy of the last committed state, if the session exists.
    /// Waits for any in-flight turn on the same session to commit first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the repository fails.
    pub async fn snapshot(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<SessionState>, DomainError> {
        let guard = self.lock(session_id).await?;
        Ok(guard.state().cloned())
    }

    /// Records a named snapshot in the repository.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the repository fails.
    pub async fn push_snapshot(&self, snapshot: &StoredSnapshot) -> Result<(), DomainError> {
        self.repository.push_snapshot(snapshot).await
    }

    /// Lists a session's snapshots, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the repository fails.
    pub async fn list_snapshots(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<StoredSnapshot>, DomainError> {
        self.repository.list_snapshots(session_id).await
    }
}

/// Exclusive access to one session. Dropping the guard without committing
/// releases the lock and leaves the state as it was.
pub struct SessionGuard {
    session_id: SessionId,
    slot: OwnedMutexGuard<Option<Cached>>,
    cell: Cell,
    cells: CellMap,
    repository: Arc<dyn SessionRepository>,
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl SessionGuard {
    /// The session this guard protects.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The last committed state, or `None` if the session was never created.
    #[must_use]
    pub fn state(&self) -> Option<&SessionState> {
        self.slot.as_ref().map(|cached| &cached.state)
    }

    /// The last committed state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if the session was never created.
    pub fn require(&self) -> Result<&SessionState, DomainError> {
        self.state()
            .ok_or_else(|| DomainError::SessionNotFound(self.session_id.to_string()))
    }

    /// Persists `state` and makes it the live state, then releases the lock.
    /// The in-memory copy is only replaced once the repository write
    /// succeeded.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if serialization or the
    /// repository write fails; the previous state is kept.
    pub async fn commit(mut self, state: SessionState) -> Result<SessionState, DomainError> {
        let version = self.slot.as_ref().map_or(0, |cached| cached.version) + 1;
        let payload = serde_json::to_value(&state).map_err(|e| {
            DomainError::Infrastructure(format!("session serialization failed: {e}"))
        })?;
        self.repository
            .save_session(&StoredSession {
                session_id: self.session_id.clone(),
                payload,
                version,
                saved_at: state.updated_at,
            })
            .await?;
        debug!(session_id = %self.session_id, version, "session committed");
        *self.slot = Some(Cached {
            state: state.clone(),
            version,
        });
        Ok(state)
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.slot.is_some() {
            return;
        }
        let Ok(mut cells) = self.cells.lock() else {
            return;
        };
        // Holders: the map, `self.cell` and the mutex guard. Anyone else
        // cloned the cell under the map lock and is waiting on it.
        let unshared = Arc::strong_count(&self.cell) == 3;
        if unshared
            && cells
                .get(&self.session_id)
                .is_some_and(|cell| Arc::ptr_eq(cell, &self.cell))
        {
            cells.remove(&self.session_id);
        }
    }
}
