//! Commands for the Session & Progress context.

use sagaforge_character::CharacterClass;
use sagaforge_core::command::Command;
use sagaforge_core::id::SessionId;
use uuid::Uuid;

/// Command to create a session, or reset an existing one to its first phase.
#[derive(Debug, Clone)]
pub struct StartSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Target session.
    pub session_id: SessionId,
}

impl Command for StartSession {
    fn command_type(&self) -> &'static str {
        "session.start_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

/// Command to choose the world a session is played in.
#[derive(Debug, Clone)]
pub struct SelectWorld {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Target session.
    pub session_id: SessionId,
    /// Catalog key of the world.
    pub world_id: String,
}

impl Command for SelectWorld {
    fn command_type(&self) -> &'static str {
        "session.select_world"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

/// One requested party member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyMember {
    /// Display name.
    pub name: String,
    /// Chosen class.
    pub class: CharacterClass,
}

/// Command to (re)assemble the party.
#[derive(Debug, Clone)]
pub struct SetupParty {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Target session.
    pub session_id: SessionId,
    /// Members in turn order.
    pub members: Vec<PartyMember>,
}

impl Command for SetupParty {
    fn command_type(&self) -> &'static str {
        "session.setup_party"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

/// Command to generate the outline and play the opening turn.
#[derive(Debug, Clone)]
pub struct BeginAdventure {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Target session.
    pub session_id: SessionId,
}

impl Command for BeginAdventure {
    fn command_type(&self) -> &'static str {
        "session.begin_adventure"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

/// Command to resolve one party member's action.
#[derive(Debug, Clone)]
pub struct SubmitTurn {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Target session.
    pub session_id: SessionId,
    /// Index of the acting player in the party.
    pub acting_player_index: usize,
    /// Free-text action. Ignored for the intro turn.
    pub action: String,
    /// Plays the opening narration instead of an action.
    pub is_intro: bool,
}

impl Command for SubmitTurn {
    fn command_type(&self) -> &'static str {
        "session.submit_turn"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

/// Command to store a named copy of the current state.
#[derive(Debug, Clone)]
pub struct SaveSnapshot {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Target session.
    pub session_id: SessionId,
    /// Player-facing save name.
    pub name: String,
}

impl Command for SaveSnapshot {
    fn command_type(&self) -> &'static str {
        "session.save_snapshot"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

/// Command to replace the live state with a saved copy.
#[derive(Debug, Clone)]
pub struct RestoreSnapshot {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Target session.
    pub session_id: SessionId,
    /// Snapshot to restore.
    pub snapshot_id: Uuid,
}

impl Command for RestoreSnapshot {
    fn command_type(&self) -> &'static str {
        "session.restore_snapshot"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}
