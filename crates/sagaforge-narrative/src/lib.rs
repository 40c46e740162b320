//! Sagaforge — Narrative bounded context.
//!
//! Responsible for everything that crosses the boundary to the narrator
//! collaborator: the context handed to it, the prompts rendered from that
//! context, and the validation of the untrusted effects block it returns.

pub mod application;
pub mod domain;

pub use application::narrator::{FALLBACK_NARRATION, Narrator, OutlineGenerator};
pub use application::scripted::ScriptedNarrator;
pub use domain::context::{NarrationPrompt, TurnContext, render_outline_prompt};
pub use domain::effects::{Effect, Outcome, ParsedNarration, parse_narration};
pub use domain::outline::{Act, Scene, StoryOutline};
pub use domain::transcript::{Message, Speaker};
