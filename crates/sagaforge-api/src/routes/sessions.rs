//! Routes for the Session & Progress bounded context.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use sagaforge_character::CharacterClass;
use sagaforge_core::id::SessionId;
use sagaforge_rules::DiceRoll;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use sagaforge_session::application::command_handlers::{self, TurnOutcome};
use sagaforge_session::application::query_handlers::{self, SessionView, SnapshotSummary};
use sagaforge_session::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{session_id}/world.
#[derive(Debug, Deserialize)]
pub struct SelectWorldRequest {
    /// Catalog key of the world.
    pub world_id: String,
}

/// One member in a party setup request.
#[derive(Debug, Deserialize)]
pub struct PartyMemberRequest {
    /// Display name.
    pub name: String,
    /// Class name, English or Polish.
    pub class: String,
}

/// Request body for POST /{session_id}/party.
#[derive(Debug, Deserialize)]
pub struct SetupPartyRequest {
    /// Members in turn order.
    pub members: Vec<PartyMemberRequest>,
}

/// Request body for POST /{session_id}/turns.
#[derive(Debug, Deserialize)]
pub struct SubmitTurnRequest {
    /// Index of the acting player.
    pub acting_player_index: usize,
    /// What the player does.
    #[serde(default)]
    pub action: String,
    /// Replays the opening narration instead of an action.
    #[serde(default)]
    pub is_intro: bool,
}

/// Request body for POST /{session_id}/saves.
#[derive(Debug, Deserialize)]
pub struct SaveSnapshotRequest {
    /// Player-facing save name.
    pub name: String,
}

/// Response body for a resolved turn.
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    /// Narration shown to the players.
    pub narration: String,
    /// Dice result; absent for the intro turn.
    pub roll: Option<DiceRoll>,
    /// Session state after the turn.
    pub state: SessionView,
}

impl From<TurnOutcome> for TurnResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            narration: outcome.narration,
            roll: outcome.roll,
            state: SessionView::from(outcome.state),
        }
    }
}

fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    Ok(SessionId::parse(raw)?)
}

/// POST /{session_id}/start
#[instrument(skip(state))]
async fn start_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::StartSession {
        correlation_id: Uuid::new_v4(),
        session_id: parse_session_id(&session_id)?,
    };

    info!(correlation_id = %command.correlation_id, "handling start_session command");

    let session =
        command_handlers::handle_start_session(&command, state.clock.as_ref(), &state.store)
            .await?;

    Ok(Json(SessionView::from(session)))
}

/// GET /{session_id}
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let view = query_handlers::get_session(&session_id, &state.store).await?;
    Ok(Json(view))
}

/// POST /{session_id}/world
#[instrument(skip(state, request), fields(world_id = %request.world_id))]
async fn select_world(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SelectWorldRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::SelectWorld {
        correlation_id: Uuid::new_v4(),
        session_id: parse_session_id(&session_id)?,
        world_id: request.world_id,
    };

    info!(correlation_id = %command.correlation_id, "handling select_world command");

    let session = command_handlers::handle_select_world(
        &command,
        state.clock.as_ref(),
        &state.store,
        &state.worlds,
    )
    .await?;

    Ok(Json(SessionView::from(session)))
}

/// POST /{session_id}/party
#[instrument(skip(state, request), fields(party_size = request.members.len()))]
async fn setup_party(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SetupPartyRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let members = request
        .members
        .into_iter()
        .map(|member| {
            Ok(commands::PartyMember {
                class: member.class.parse::<CharacterClass>()?,
                name: member.name,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;
    let command = commands::SetupParty {
        correlation_id: Uuid::new_v4(),
        session_id: parse_session_id(&session_id)?,
        members,
    };

    info!(correlation_id = %command.correlation_id, "handling setup_party command");

    let session =
        command_handlers::handle_setup_party(&command, state.clock.as_ref(), &state.store).await?;

    Ok(Json(SessionView::from(session)))
}

/// POST /{session_id}/begin
#[instrument(skip(state))]
async fn begin_adventure(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<TurnResponse>, ApiError> {
    let command = commands::BeginAdventure {
        correlation_id: Uuid::new_v4(),
        session_id: parse_session_id(&session_id)?,
    };

    info!(correlation_id = %command.correlation_id, "handling begin_adventure command");

    let outcome = command_handlers::handle_begin_adventure(
        &command,
        state.clock.as_ref(),
        &state.rng,
        &state.store,
        state.narrator.as_ref(),
        state.outline_generator.as_ref(),
        state.narrator_timeout,
    )
    .await?;

    Ok(Json(TurnResponse::from(outcome)))
}

/// POST /{session_id}/turns
#[instrument(skip(state, request), fields(acting_player_index = request.acting_player_index))]
async fn submit_turn(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SubmitTurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let command = commands::SubmitTurn {
        correlation_id: Uuid::new_v4(),
        session_id: parse_session_id(&session_id)?,
        acting_player_index: request.acting_player_index,
        action: request.action,
        is_intro: request.is_intro,
    };

    info!(correlation_id = %command.correlation_id, "handling submit_turn command");

    let outcome = command_handlers::handle_submit_turn(
        &command,
        state.clock.as_ref(),
        &state.rng,
        &state.store,
        state.narrator.as_ref(),
        state.narrator_timeout,
    )
    .await?;

    Ok(Json(TurnResponse::from(outcome)))
}

/// POST /{session_id}/saves
#[instrument(skip(state, request))]
async fn save_snapshot(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SaveSnapshotRequest>,
) -> Result<Json<SnapshotSummary>, ApiError> {
    let command = commands::SaveSnapshot {
        correlation_id: Uuid::new_v4(),
        session_id: parse_session_id(&session_id)?,
        name: request.name,
    };

    info!(correlation_id = %command.correlation_id, "handling save_snapshot command");

    let summary =
        command_handlers::handle_save_snapshot(&command, state.clock.as_ref(), &state.store)
            .await?;

    Ok(Json(summary))
}

/// GET /{session_id}/saves
#[instrument(skip(state))]
async fn list_snapshots(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<SnapshotSummary>>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let snapshots = query_handlers::list_snapshots(&session_id, &state.store).await?;
    Ok(Json(snapshots))
}

/// POST /{session_id}/saves/{snapshot_id}/restore
#[instrument(skip(state))]
async fn restore_snapshot(
    State(state): State<AppState>,
    Path((session_id, snapshot_id)): Path<(String, Uuid)>,
) -> Result<Json<SessionView>, ApiError> {
    let command = commands::RestoreSnapshot {
        correlation_id: Uuid::new_v4(),
        session_id: parse_session_id(&session_id)?,
        snapshot_id,
    };

    info!(correlation_id = %command.correlation_id, "handling restore_snapshot command");

    let session =
        command_handlers::handle_restore_snapshot(&command, state.clock.as_ref(), &state.store)
            .await?;

    Ok(Json(SessionView::from(session)))
}

/// Returns the router for the session context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{session_id}", get(get_session))
        .route("/{session_id}/start", post(start_session))
        .route("/{session_id}/world", post(select_world))
        .route("/{session_id}/party", post(setup_party))
        .route("/{session_id}/begin", post(begin_adventure))
        .route("/{session_id}/turns", post(submit_turn))
        .route(
            "/{session_id}/saves",
            post(save_snapshot).get(list_snapshots),
        )
        .route(
            "/{session_id}/saves/{snapshot_id}/restore",
            post(restore_snapshot),
        )
}
