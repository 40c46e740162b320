//! In-memory implementation of the `SessionRepository` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use sagaforge_core::error::DomainError;
use sagaforge_core::id::SessionId;
use sagaforge_core::repository::{
    SessionRepository, StoredSession, StoredSnapshot, push_bounded,
};

/// Process-local session repository. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, StoredSession>>,
    snapshots: RwLock<HashMap<SessionId, Vec<StoredSnapshot>>>,
}

impl InMemorySessionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn load_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<StoredSession>, DomainError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn save_session(&self, session: &StoredSession) -> Result<(), DomainError> {
        self.sessions
            .write()
            .await
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn push_snapshot(&self, snapshot: &StoredSnapshot) -> Result<(), DomainError> {
        let mut snapshots = self.snapshots.write().await;
        push_bounded(
            snapshots.entry(snapshot.session_id.clone()).or_default(),
            snapshot.clone(),
        );
        Ok(())
    }

    async fn list_snapshots(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<StoredSnapshot>, DomainError> {
        Ok(self
            .snapshots
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }
}
