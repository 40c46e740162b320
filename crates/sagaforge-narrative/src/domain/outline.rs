//! Story outline produced once at session start.
//!
//! The outline is reference material for later turns. It is checked for
//! structural shape only; its content is never validated.

use serde::{Deserialize, Serialize};

use super::effects::{extract_block_json, parse_block_json};

/// One scene of an act.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Scene title.
    pub title: String,
    /// What the party should accomplish here.
    pub goal: String,
    /// Narrative hooks the narrator may pull on.
    pub hooks: Vec<String>,
    /// Threats lurking in the scene.
    pub dangers: Vec<String>,
}

/// One act of the outline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Act {
    /// Act title.
    pub title: String,
    /// Ordered scenes.
    pub scenes: Vec<Scene>,
}

/// Three-act story skeleton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryOutline {
    /// One-paragraph summary.
    pub synopsis: String,
    /// Ordered acts.
    pub acts: Vec<Act>,
}

impl StoryOutline {
    /// Parses an outline out of generator output: either a fenced JSON block
    /// or a bare JSON object. Returns `None` if nothing outline-shaped is
    /// found or the outline is empty.
    #[must_use]
    pub fn from_generator_output(raw: &str) -> Option<Self> {
        let value = extract_block_json(raw).or_else(|| parse_block_json(raw))?;
        let outline: Self = serde_json::from_value(value).ok()?;
        (!outline.synopsis.trim().is_empty() || !outline.acts.is_empty()).then_some(outline)
    }

    /// The first scene of the first act, if any.
    #[must_use]
    pub fn opening_scene(&self) -> Option<&Scene> {
        self.acts.first().and_then(|act| act.scenes.first())
    }
}
