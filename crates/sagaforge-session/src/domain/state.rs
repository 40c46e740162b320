//! Authoritative per-session state.

use chrono::{DateTime, Utc};
use sagaforge_character::Player;
use sagaforge_core::id::SessionId;
use sagaforge_narrative::{Message, Outcome, StoryOutline};
use sagaforge_world::World;
use serde::{Deserialize, Serialize};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Freshly started; no world chosen yet.
    #[default]
    AwaitingWorldSelection,
    /// World chosen; waiting for the party.
    AwaitingPartySetup,
    /// Party assembled; waiting for the adventure to begin.
    AwaitingStoryOutline,
    /// Turns are being played.
    Active,
    /// The session is over. Nothing but the transcript changes from here.
    Terminal,
}

impl SessionPhase {
    /// Snake-case name used in error messages and views.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingWorldSelection => "awaiting_world_selection",
            Self::AwaitingPartySetup => "awaiting_party_setup",
            Self::AwaitingStoryOutline => "awaiting_story_outline",
            Self::Active => "active",
            Self::Terminal => "terminal",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full state of one play session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Opaque session identifier.
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
    /// Verdict, `None` while in play.
    pub outcome: Outcome,
    /// Full transcript, oldest first.
    pub messages: Vec<Message>,
    /// Story outline generated when the adventure began.
    pub story: Option<StoryOutline>,
    /// Number of resolved turns, intro included.
    pub turn_count: u32,
    /// When the session was (re)started.
    pub created_at: DateTime<Utc>,
    /// When the session last changed.
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    /// Creates a fresh session waiting for a world.
    #[must_use]
    pub fn new(session_id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            phase: SessionPhase::AwaitingWorldSelection,
            world: None,
            players: Vec::new(),
            active_index: 0,
            goal: None,
            quest_log: Vec::new(),
            is_over: false,
            outcome: Outcome::None,
            messages: Vec::new(),
            story: None,
            turn_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` once the session has ended.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_over || self.phase == SessionPhase::Terminal
    }

    /// The last `window` transcript messages, oldest first.
    #[must_use]
    pub fn recent_messages(&self, window: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(window);
        &self.messages[start..]
    }

    /// The player expected to act next, if the party is non-empty.
    #[must_use]
    pub fn active_player(&self) -> Option<&Player> {
        self.players.get(self.active_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagaforge_character::CharacterClass;
    use sagaforge_test_support::fixed_clock;

    fn state() -> SessionState {
        SessionState::new(SessionId::parse("s-1").unwrap(), fixed_clock().0)
    }

    #[test]
    fn test_new_session_awaits_world_selection() {
        let state = state();
        assert_eq!(state.phase, SessionPhase::AwaitingWorldSelection);
        assert!(!state.is_terminal());
        assert_eq!(state.outcome, Outcome::None);
        assert!(state.active_player().is_none());
    }

    #[test]
    fn test_recent_messages_returns_tail() {
        let mut state = state();
        for i in 0..20 {
            state.messages.push(Message::assistant(format!("line {i}")));
        }
        let recent = state.recent_messages(12);
        assert_eq!(recent.len(), 12);
        assert_eq!(recent[0].text, "line 8");
        assert_eq!(recent[11].text, "line 19");
    }

    #[test]
    fn test_state_survives_json_round_trip() {
        let mut state = state();
        state.players.push(Player::from_class("Borys", CharacterClass::Warrior));
        state.phase = SessionPhase::Active;

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["phase"], "active");
        let back: SessionState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
