//! File-backed implementation of the `SessionRepository` trait.
//!
//! Layout under the data directory:
//!
//! ```text
//! sessions/<sha256(session_id)>.json   current StoredSession
//! saves/<sha256(session_id)>.json      Vec<StoredSnapshot>, most recent first
//! ```
//!
//! Session ids are hashed so arbitrary ids never touch the filesystem as
//! path components. Writes go to a temporary file that is then renamed
//! over the target.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use sagaforge_core::error::DomainError;
use sagaforge_core::id::SessionId;
use sagaforge_core::repository::{
    SessionRepository, StoredSession, StoredSnapshot, push_bounded,
};

const SESSIONS_DIR: &str = "sessions";
const SAVES_DIR: &str = "saves";

/// Session repository storing one JSON document per session.
#[derive(Debug)]
pub struct FileSessionRepository {
    root: PathBuf,
    // Serializes read-modify-write of save lists.
    saves_lock: Mutex<()>,
}

impl FileSessionRepository {
    /// Opens (creating if needed) a repository rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the directories cannot be
    /// created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let root = root.into();
        for dir in [SESSIONS_DIR, SAVES_DIR] {
            fs::create_dir_all(root.join(dir))
                .await
                .map_err(|e| io_error("create data directory", &root, &e))?;
        }
        debug!(root = %root.display(), "file session repository opened");
        Ok(Self {
            root,
            saves_lock: Mutex::new(()),
        })
    }

    /// Root directory of this repository.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, dir: &str, session_id: &SessionId) -> PathBuf {
        self.root
            .join(dir)
            .join(format!("{}.json", file_stem(session_id)))
    }
}

/// Lowercase hex SHA-256 of the session id.
fn file_stem(session_id: &SessionId) -> String {
    hex::encode(Sha256::digest(session_id.as_str().as_bytes()))
}

fn io_error(action: &str, path: &Path, error: &std::io::Error) -> DomainError {
    DomainError::Infrastructure(format!("{action} {}: {error}", path.display()))
}

async fn read_json(path: &Path) -> Result<Option<Value>, DomainError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error("read", path, &e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| DomainError::Infrastructure(format!("decode {}: {e}", path.display())))
}

async fn write_json(path: &Path, value: &Value) -> Result<(), DomainError> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| DomainError::Infrastructure(format!("encode {}: {e}", path.display())))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)
        .await
        .map_err(|e| io_error("write", &tmp, &e))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| io_error("replace", path, &e))
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, path: &Path) -> Result<T, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::Infrastructure(format!("decode {}: {e}", path.display())))
}

fn encode<T: serde::Serialize>(value: &T, path: &Path) -> Result<Value, DomainError> {
    serde_json::to_value(value)
        .map_err(|e| DomainError::Infrastructure(format!("encode {}: {e}", path.display())))
}

impl FileSessionRepository {
    async fn read_saves(&self, session_id: &SessionId) -> Result<Vec<StoredSnapshot>, DomainError> {
        let path = self.document_path(SAVES_DIR, session_id);
        match read_json(&path).await? {
            Some(value) => decode(value, &path),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl SessionRepository for FileSessionRepository {
    async fn load_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<StoredSession>, DomainError> {
        let path = self.document_path(SESSIONS_DIR, session_id);
        match read_json(&path).await? {
            Some(value) => decode(value, &path).map(Some),
            None => Ok(None),
        }
    }

    async fn save_session(&self, session: &StoredSession) -> Result<(), DomainError> {
        let path = self.document_path(SESSIONS_DIR, &session.session_id);
        write_json(&path, &encode(session, &path)?).await?;
        debug!(
            session_id = %session.session_id,
            version = session.version,
            "session document written"
        );
        Ok(())
    }

    async fn push_snapshot(&self, snapshot: &StoredSnapshot) -> Result<(), DomainError> {
        let _guard = self.saves_lock.lock().await;
        let mut saves = self.read_saves(&snapshot.session_id).await?;
        push_bounded(&mut saves, snapshot.clone());
        let path = self.document_path(SAVES_DIR, &snapshot.session_id);
        write_json(&path, &encode(&saves, &path)?).await
    }

    async fn list_snapshots(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<StoredSnapshot>, DomainError> {
        let _guard = self.saves_lock.lock().await;
        self.read_saves(session_id).await
    }
}
