//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sagaforge_core::clock::Clock;
use sagaforge_core::repository::SessionRepository;
use sagaforge_core::rng::DeterministicRng;
use sagaforge_narrative::ScriptedNarrator;
use sagaforge_store::InMemorySessionRepository;
use sagaforge_test_support::{MockRng, SequenceRng, fixed_clock};
use sagaforge_world::WorldCatalog;
use tower::ServiceExt;

use sagaforge_api::build_router;
use sagaforge_api::state::AppState;

/// A fresh shared repository. Apps built over the same repository see each
/// other's committed sessions, like two server processes on one data dir.
pub fn memory_repository() -> Arc<dyn SessionRepository> {
    Arc::new(InMemorySessionRepository::new())
}

/// Build the full app router with the scripted narrator, a fixed clock and an
/// RNG that always rolls a natural 1.
pub fn build_test_app(repository: Arc<dyn SessionRepository>) -> Router {
    build_test_app_with_rng(repository, MockRng)
}

/// Build the full app router with a custom `SequenceRng` for tests that need
/// specific dice rolls.
pub fn build_test_app_with_sequence(
    repository: Arc<dyn SessionRepository>,
    rolls: Vec<u32>,
) -> Router {
    build_test_app_with_rng(repository, SequenceRng::new(rolls))
}

fn build_test_app_with_rng(
    repository: Arc<dyn SessionRepository>,
    rng: impl DeterministicRng + Send + 'static,
) -> Router {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(fixed_clock());
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    let app_state = AppState::new(
        clock,
        rng,
        repository,
        Arc::new(ScriptedNarrator),
        Arc::new(ScriptedNarrator),
        WorldCatalog::builtin(),
        Duration::from_secs(5),
    );
    build_router(app_state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Start `session_id`, select Emberwood and seat a warrior and a mage.
pub async fn seat_party(repository: &Arc<dyn SessionRepository>, session_id: &str) {
    let base = format!("/api/v1/sessions/{session_id}");

    let (status, _) = post_empty(build_test_app(repository.clone()), &format!("{base}/start")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(
        build_test_app(repository.clone()),
        &format!("{base}/world"),
        &serde_json::json!({ "world_id": "emberwood" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(
        build_test_app(repository.clone()),
        &format!("{base}/party"),
        &serde_json::json!({ "members": [
            { "name": "Borys", "class": "wojownik" },
            { "name": "Ida", "class": "Mage" }
        ] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
