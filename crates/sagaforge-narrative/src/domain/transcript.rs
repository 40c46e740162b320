//! Session transcript entries.

use serde::{Deserialize, Serialize};

/// Who said a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// A party member's action.
    User,
    /// The narrator.
    Assistant,
    /// Engine notices (session start, restores).
    System,
}

/// One line of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Speaker role.
    pub role: Speaker,
    /// Line text.
    pub text: String,
}

impl Message {
    /// A party member's line.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Speaker::User,
            text: text.into(),
        }
    }

    /// A narrator line.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Speaker::Assistant,
            text: text.into(),
        }
    }

    /// An engine notice.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Speaker::System,
            text: text.into(),
        }
    }
}
