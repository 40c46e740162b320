//! Integration tests for `FileSessionRepository` against a temporary
//! directory.

use chrono::Duration;
use sagaforge_core::id::SessionId;
use sagaforge_core::repository::{
    MAX_SNAPSHOTS, SessionRepository, StoredSession, StoredSnapshot,
};
use sagaforge_store::FileSessionRepository;
use sagaforge_test_support::fixed_clock;
use uuid::Uuid;

fn id(raw: &str) -> SessionId {
    SessionId::parse(raw).unwrap()
}

fn session(raw: &str, version: i64) -> StoredSession {
    StoredSession {
        session_id: id(raw),
        payload: serde_json::json!({ "turn_count": version }),
        version,
        saved_at: fixed_clock().0,
    }
}

fn snapshot(raw: &str, name: &str, minute: i64) -> StoredSnapshot {
    StoredSnapshot {
        snapshot_id: Uuid::new_v4(),
        session_id: id(raw),
        name: name.to_owned(),
        payload: serde_json::json!({ "name": name }),
        saved_at: fixed_clock().0 + Duration::minutes(minute),
    }
}

#[tokio::test]
async fn test_session_round_trips_through_disk() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let repo = FileSessionRepository::open(dir.path()).await.unwrap();

    // Act
    repo.save_session(&session("table-1", 1)).await.unwrap();
    repo.save_session(&session("table-1", 2)).await.unwrap();
    let loaded = repo.load_session(&id("table-1")).await.unwrap().unwrap();

    // Assert
    assert_eq!(loaded.version, 2);
    assert_eq!(loaded.payload["turn_count"], 2);
    assert_eq!(loaded.saved_at, fixed_clock().0);
}

#[tokio::test]
async fn test_unknown_session_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let repo = FileSessionRepository::open(dir.path()).await.unwrap();

    assert!(repo.load_session(&id("nobody")).await.unwrap().is_none());
    assert!(repo.list_snapshots(&id("nobody")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_data_survives_reopening() {
    let dir = tempfile::tempdir().unwrap();
    {
        let repo = FileSessionRepository::open(dir.path()).await.unwrap();
        repo.save_session(&session("table-1", 3)).await.unwrap();
        repo.push_snapshot(&snapshot("table-1", "camp", 0))
            .await
            .unwrap();
    }

    let reopened = FileSessionRepository::open(dir.path()).await.unwrap();

    let loaded = reopened.load_session(&id("table-1")).await.unwrap().unwrap();
    assert_eq!(loaded.version, 3);
    let saves = reopened.list_snapshots(&id("table-1")).await.unwrap();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].name, "camp");
}

#[tokio::test]
async fn test_snapshots_are_most_recent_first_and_bounded() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let repo = FileSessionRepository::open(dir.path()).await.unwrap();

    // Act
    for i in 0..12 {
        repo.push_snapshot(&snapshot("table-1", &format!("save {i}"), i))
            .await
            .unwrap();
    }
    repo.push_snapshot(&snapshot("table-2", "other", 0))
        .await
        .unwrap();

    // Assert
    let saves = repo.list_snapshots(&id("table-1")).await.unwrap();
    assert_eq!(saves.len(), MAX_SNAPSHOTS);
    assert_eq!(saves[0].name, "save 11");
    assert_eq!(saves[MAX_SNAPSHOTS - 1].name, "save 2");
    assert_eq!(repo.list_snapshots(&id("table-2")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_corrupt_document_is_an_infrastructure_error() {
    let dir = tempfile::tempdir().unwrap();
    let repo = FileSessionRepository::open(dir.path()).await.unwrap();
    repo.save_session(&session("table-1", 1)).await.unwrap();
    let sessions_dir = dir.path().join("sessions");
    let file = std::fs::read_dir(&sessions_dir)
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    std::fs::write(file, b"{ not json").unwrap();

    let result = repo.load_session(&id("table-1")).await;

    assert!(matches!(
        result,
        Err(sagaforge_core::error::DomainError::Infrastructure(_))
    ));
}
