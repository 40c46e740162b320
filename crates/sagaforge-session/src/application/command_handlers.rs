//! Command handlers for the Session & Progress context.
//!
//! These walk a session through its lifecycle:
//! world selection, party setup, the opening turn, then player turns until
//! the session is over. Every handler holds the session's lock from the
//! first read to the commit, so a turn's narrator call never races another
//! turn for the same session.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sagaforge_character::Player;
use sagaforge_core::clock::Clock;
use sagaforge_core::error::DomainError;
use sagaforge_core::repository::StoredSnapshot;
use sagaforge_core::rng::DeterministicRng;
use sagaforge_narrative::domain::context::RECENT_MESSAGE_WINDOW;
use sagaforge_narrative::{
    FALLBACK_NARRATION, Message, Narrator, OutlineGenerator, StoryOutline, TurnContext,
    parse_narration,
};
use sagaforge_rules::DiceRoll;
use sagaforge_rules::application::resolver::roll_for_action;
use sagaforge_world::{World, WorldCatalog};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::query_handlers::SnapshotSummary;
use crate::application::store::SessionStore;
use crate::domain::commands::{
    BeginAdventure, RestoreSnapshot, SaveSnapshot, SelectWorld, SetupParty, StartSession,
    SubmitTurn,
};
use crate::domain::reducer;
use crate::domain::state::{SessionPhase, SessionState};

/// Largest party a session accepts.
pub const MAX_PARTY_SIZE: usize = 8;

/// Result of a resolved turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Narration shown to the players, effects block removed.
    pub narration: String,
    /// Dice result; absent for the intro turn.
    pub roll: Option<DiceRoll>,
    /// Committed session state after the turn.
    pub state: SessionState,
}

fn require_phase(state: &SessionState, expected: &[SessionPhase]) -> Result<(), DomainError> {
    if state.is_terminal() {
        return Err(DomainError::Validation("session is over".to_owned()));
    }
    if expected.contains(&state.phase) {
        return Ok(());
    }
    let expected = expected
        .iter()
        .map(|phase| phase.as_str())
        .collect::<Vec<_>>()
        .join(" or ");
    Err(DomainError::Validation(format!(
        "session is {}; expected {expected}",
        state.phase
    )))
}

/// Handles the `StartSession` command: creates the session, or resets an
/// existing one back to world selection.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the repository write fails.
#[instrument(skip_all, fields(session_id = %command.session_id, correlation_id = %command.correlation_id))]
pub async fn handle_start_session(
    command: &StartSession,
    clock: &dyn Clock,
    store: &SessionStore,
) -> Result<SessionState, DomainError> {
    let state = store.reset(&command.session_id, clock.now()).await?;
    info!("session started");
    Ok(state)
}

/// Handles the `SelectWorld` command.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` for an unknown session,
/// `DomainError::WorldNotFound` for an unknown world and
/// `DomainError::Validation` if a world was already chosen.
#[instrument(skip_all, fields(session_id = %command.session_id, correlation_id = %command.correlation_id))]
pub async fn handle_select_world(
    command: &SelectWorld,
    clock: &dyn Clock,
    store: &SessionStore,
    catalog: &WorldCatalog,
) -> Result<SessionState, DomainError> {
    let guard = store.lock(&command.session_id).await?;
    let mut state = guard.require()?.clone();
    require_phase(&state, &[SessionPhase::AwaitingWorldSelection])?;

    let world = catalog.require(command.world_id.trim())?.clone();
    info!(world_id = %world.id, "world selected");
    state.world = Some(world);
    state.phase = SessionPhase::AwaitingPartySetup;
    state.updated_at = clock.now();

    guard.commit(state).await
}

/// Handles the `SetupParty` command: (re)creates every party member from
/// the class registry. Allowed again until the adventure begins.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an empty or oversized party, a
/// blank name, or a session in the wrong phase.
#[instrument(skip_all, fields(session_id = %command.session_id, correlation_id = %command.correlation_id))]
pub async fn handle_setup_party(
    command: &SetupParty,
    clock: &dyn Clock,
    store: &SessionStore,
) -> Result<SessionState, DomainError> {
    if command.members.is_empty() {
        return Err(DomainError::Validation(
            "party needs at least one member".to_owned(),
        ));
    }
    if command.members.len() > MAX_PARTY_SIZE {
        return Err(DomainError::Validation(format!(
            "party is limited to {MAX_PARTY_SIZE} members"
        )));
    }
    if command.members.iter().any(|m| m.name.trim().is_empty()) {
        return Err(DomainError::Validation(
            "party member name must not be blank".to_owned(),
        ));
    }

    let guard = store.lock(&command.session_id).await?;
    let mut state = guard.require()?.clone();
    require_phase(
        &state,
        &[
            SessionPhase::AwaitingPartySetup,
            SessionPhase::AwaitingStoryOutline,
        ],
    )?;

    state.players = command
        .members
        .iter()
        .map(|m| Player::from_class(m.name.trim(), m.class))
        .collect();
    state.active_index = 0;
    state.phase = SessionPhase::AwaitingStoryOutline;
    state.updated_at = clock.now();
    info!(party_size = state.players.len(), "party assembled");

    guard.commit(state).await
}

/// Handles the `BeginAdventure` command: asks for a story outline, makes
/// the session active and plays the opening turn. A failed or empty
/// outline does not block the session.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` for an unknown session and
/// `DomainError::Validation` if the party is not assembled yet.
#[instrument(skip_all, fields(session_id = %command.session_id, correlation_id = %command.correlation_id))]
pub async fn handle_begin_adventure(
    command: &BeginAdventure,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    store: &SessionStore,
    narrator: &dyn Narrator,
    outline_generator: &dyn OutlineGenerator,
    narrator_timeout: Duration,
) -> Result<TurnOutcome, DomainError> {
    let guard = store.lock(&command.session_id).await?;
    let mut state = guard.require()?.clone();
    require_phase(&state, &[SessionPhase::AwaitingStoryOutline])?;
    let world = state
        .world
        .clone()
        .ok_or_else(|| DomainError::Validation("no world selected".to_owned()))?;

    state.story =
        generate_outline_or_none(outline_generator, &world, &state.players, narrator_timeout)
            .await;
    state.phase = SessionPhase::Active;
    state.active_index = 0;
    info!(has_outline = state.story.is_some(), "adventure begins");

    let turn = Turn {
        acting_index: 0,
        action: "",
        is_intro: true,
    };
    let (state, narration, roll) =
        play_turn(state, &turn, rng, narrator, narrator_timeout, clock.now()).await?;
    let state = guard.commit(state).await?;

    Ok(TurnOutcome {
        narration,
        roll,
        state,
    })
}

/// Handles the `SubmitTurn` command: rolls for the action, asks the
/// narrator, applies the validated effect and hands the turn to the next
/// living player.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` for an unknown session and
/// `DomainError::Validation` for a blank action, a bad player index, a
/// downed player or a session that is not in play.
#[instrument(skip_all, fields(
    session_id = %command.session_id,
    correlation_id = %command.correlation_id,
    acting_player_index = command.acting_player_index,
    is_intro = command.is_intro
))]
pub async fn handle_submit_turn(
    command: &SubmitTurn,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    store: &SessionStore,
    narrator: &dyn Narrator,
    narrator_timeout: Duration,
) -> Result<TurnOutcome, DomainError> {
    let action = command.action.trim();
    if !command.is_intro && action.is_empty() {
        return Err(DomainError::Validation("action must not be blank".to_owned()));
    }

    let guard = store.lock(&command.session_id).await?;
    let state = guard.require()?.clone();
    require_phase(&state, &[SessionPhase::Active])?;

    let Some(player) = state.players.get(command.acting_player_index) else {
        return Err(DomainError::Validation(format!(
            "no player at index {}",
            command.acting_player_index
        )));
    };
    if !command.is_intro && player.is_down() {
        return Err(DomainError::Validation(format!(
            "{} is down and cannot act",
            player.name
        )));
    }

    let turn = Turn {
        acting_index: command.acting_player_index,
        action,
        is_intro: command.is_intro,
    };
    let (state, narration, roll) =
        play_turn(state, &turn, rng, narrator, narrator_timeout, clock.now()).await?;
    let state = guard.commit(state).await?;
    info!(
        turn = state.turn_count,
        is_over = state.is_over,
        "turn resolved"
    );

    Ok(TurnOutcome {
        narration,
        roll,
        state,
    })
}

/// Handles the `SaveSnapshot` command: stores a named copy of the current
/// state.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank name,
/// `DomainError::SessionNotFound` for an unknown session and
/// `DomainError::Infrastructure` if the repository write fails.
#[instrument(skip_all, fields(session_id = %command.session_id, correlation_id = %command.correlation_id))]
pub async fn handle_save_snapshot(
    command: &SaveSnapshot,
    clock: &dyn Clock,
    store: &SessionStore,
) -> Result<SnapshotSummary, DomainError> {
    let name = command.name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation("save name must not be blank".to_owned()));
    }

    let guard = store.lock(&command.session_id).await?;
    let state = guard.require()?;
    let payload = serde_json::to_value(state).map_err(|e| {
        DomainError::Infrastructure(format!("session serialization failed: {e}"))
    })?;
    let snapshot = StoredSnapshot {
        snapshot_id: Uuid::new_v4(),
        session_id: command.session_id.clone(),
        name: name.to_owned(),
        payload,
        saved_at: clock.now(),
    };
    store.push_snapshot(&snapshot).await?;
    info!(snapshot_id = %snapshot.snapshot_id, "snapshot saved");

    Ok(SnapshotSummary::from(&snapshot))
}

/// Handles the `RestoreSnapshot` command: replaces the live state with a
/// saved copy.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` for an unknown session,
/// `DomainError::SnapshotNotFound` if the save does not exist and
/// `DomainError::Infrastructure` if it cannot be decoded.
#[instrument(skip_all, fields(session_id = %command.session_id, correlation_id = %command.correlation_id))]
pub async fn handle_restore_snapshot(
    command: &RestoreSnapshot,
    clock: &dyn Clock,
    store: &SessionStore,
) -> Result<SessionState, DomainError> {
    let guard = store.lock(&command.session_id).await?;
    guard.require()?;

    let snapshot = store
        .list_snapshots(&command.session_id)
        .await?
        .into_iter()
        .find(|s| s.snapshot_id == command.snapshot_id)
        .ok_or(DomainError::SnapshotNotFound(command.snapshot_id))?;

    let mut state: SessionState = serde_json::from_value(snapshot.payload).map_err(|e| {
        DomainError::Infrastructure(format!("snapshot deserialization failed: {e}"))
    })?;
    state.session_id = command.session_id.clone();
    state
        .messages
        .push(Message::system(format!("Restored save \"{}\".", snapshot.name)));
    state.updated_at = clock.now();
    info!(snapshot_id = %command.snapshot_id, "snapshot restored");

    guard.commit(state).await
}

/// One turn to play against a state already known to be in play.
struct Turn<'a> {
    acting_index: usize,
    action: &'a str,
    is_intro: bool,
}

async fn play_turn(
    mut state: SessionState,
    turn: &Turn<'_>,
    rng: &Mutex<dyn DeterministicRng + Send>,
    narrator: &dyn Narrator,
    narrator_timeout: Duration,
    now: DateTime<Utc>,
) -> Result<(SessionState, String, Option<DiceRoll>), DomainError> {
    let actor = state.players.get(turn.acting_index);
    let roll = match actor {
        Some(player) if !turn.is_intro => Some(roll_for_action(player, turn.action, rng)?),
        _ => None,
    };
    let actor_name = actor.map(|p| p.name.clone());

    let context = TurnContext {
        world: state.world.clone(),
        party: state.players.clone(),
        outline: state.story.clone(),
        goal: state.goal.clone(),
        quest_log: state.quest_log.clone(),
        recent_messages: state.recent_messages(RECENT_MESSAGE_WINDOW).to_vec(),
        acting_index: turn.acting_index,
        action: turn.action.to_owned(),
        roll,
        is_intro: turn.is_intro,
    };

    let raw = narrate_or_fallback(narrator, &context, narrator_timeout).await;
    let parsed = parse_narration(&raw);

    if !turn.is_intro {
        let name = actor_name.as_deref().unwrap_or("Someone");
        state
            .messages
            .push(Message::user(format!("{name}: {}", turn.action)));
        if let Some(roll) = &roll {
            state.messages.push(Message::system(format!(
                "{name} rolls d20: {} + {} {} = {}",
                roll.roll,
                roll.attribute.as_str(),
                roll.modifier,
                roll.total
            )));
        }
    }

    let mut state = reducer::apply(
        state,
        parsed.effect.as_ref(),
        turn.acting_index,
        &parsed.narration,
    );
    state.turn_count += 1;
    if !turn.is_intro {
        advance_active_player(&mut state, turn.acting_index);
    }
    state.updated_at = now;

    Ok((state, parsed.narration, roll))
}

async fn narrate_or_fallback(
    narrator: &dyn Narrator,
    context: &TurnContext,
    narrator_timeout: Duration,
) -> String {
    match tokio::time::timeout(narrator_timeout, narrator.narrate(context)).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => {
            warn!(error = %e, "narrator failed; using fallback narration");
            FALLBACK_NARRATION.to_owned()
        }
        Err(_) => {
            warn!(
                timeout_ms = narrator_timeout.as_millis(),
                "narrator timed out; using fallback narration"
            );
            FALLBACK_NARRATION.to_owned()
        }
    }
}

async fn generate_outline_or_none(
    generator: &dyn OutlineGenerator,
    world: &World,
    party: &[Player],
    timeout: Duration,
) -> Option<StoryOutline> {
    match tokio::time::timeout(timeout, generator.generate_outline(world, party)).await {
        Ok(Ok(outline)) => outline,
        Ok(Err(e)) => {
            warn!(error = %e, "outline generation failed; continuing without outline");
            None
        }
        Err(_) => {
            warn!("outline generation timed out; continuing without outline");
            None
        }
    }
}

/// Hands the turn to the next player after `acting_index` who is still
/// standing. Leaves the index alone if nobody is.
fn advance_active_player(state: &mut SessionState, acting_index: usize) {
    let count = state.players.len();
    if let Some(next) = (1..=count)
        .map(|step| (acting_index + step) % count)
        .find(|&i| !state.players[i].is_down())
    {
        state.active_index = next;
    }
}
