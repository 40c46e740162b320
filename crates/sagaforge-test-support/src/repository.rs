//! Test repositories — mock `SessionRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use sagaforge_core::error::DomainError;
use sagaforge_core::id::SessionId;
use sagaforge_core::repository::{
    SessionRepository, StoredSession, StoredSnapshot, push_bounded,
};

/// A session repository that keeps everything in memory and records every
/// `save_session` call, so tests can assert on write-through behavior.
#[derive(Debug, Default)]
pub struct RecordingSessionRepository {
    saved: Mutex<Vec<StoredSession>>,
    snapshots: Mutex<Vec<StoredSnapshot>>,
}

impl RecordingSessionRepository {
    /// Create an empty recording repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository that already holds `session`.
    #[must_use]
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            saved: Mutex::new(vec![session]),
            snapshots: Mutex::new(Vec::new()),
        }
    }

    /// Returns every session document written so far, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_sessions(&self) -> Vec<StoredSession> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionRepository for RecordingSessionRepository {
    async fn load_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<StoredSession>, DomainError> {
        Ok(self
            .saved
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| &s.session_id == session_id)
            .cloned())
    }

    async fn save_session(&self, session: &StoredSession) -> Result<(), DomainError> {
        self.saved.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn push_snapshot(&self, snapshot: &StoredSnapshot) -> Result<(), DomainError> {
        push_bounded(&mut self.snapshots.lock().unwrap(), snapshot.clone());
        Ok(())
    }

    async fn list_snapshots(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<StoredSnapshot>, DomainError> {
        Ok(self
            .snapshots
            .lock()
            .unwrap()
            .iter()
            .filter(|s| &s.session_id == session_id)
            .cloned()
            .collect())
    }
}

/// A session repository that always returns an infrastructure error. Useful
/// for testing error-handling paths.
#[derive(Debug)]
pub struct FailingSessionRepository;

#[async_trait]
impl SessionRepository for FailingSessionRepository {
    async fn load_session(
        &self,
        _session_id: &SessionId,
    ) -> Result<Option<StoredSession>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn save_session(&self, _session: &StoredSession) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn push_snapshot(&self, _snapshot: &StoredSnapshot) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn list_snapshots(
        &self,
        _session_id: &SessionId,
    ) -> Result<Vec<StoredSnapshot>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
