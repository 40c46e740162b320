//! Narrator collaborator ports.

use async_trait::async_trait;
use sagaforge_character::Player;
use sagaforge_core::error::DomainError;
use sagaforge_world::World;

use crate::domain::context::TurnContext;
use crate::domain::outline::StoryOutline;

/// Narration shown when the narrator fails or times out. The turn still
/// completes with this text and no effects.
pub const FALLBACK_NARRATION: &str = "The narrator loses the thread for a moment and the world \
holds its breath. Nothing changes this turn; please try your action again.";

/// Produces prose for a turn, optionally followed by one fenced effects
/// block.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Narrates the turn described by `context`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NarratorUnavailable` if the collaborator cannot
    /// be reached or refuses the request.
    async fn narrate(&self, context: &TurnContext) -> Result<String, DomainError>;
}

/// Produces the story skeleton at session start.
#[async_trait]
pub trait OutlineGenerator: Send + Sync {
    /// Generates an outline for `party` adventuring in `world`. `Ok(None)`
    /// means the generator had nothing usable to offer.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NarratorUnavailable` if the collaborator cannot
    /// be reached.
    async fn generate_outline(
        &self,
        world: &World,
        party: &[Player],
    ) -> Result<Option<StoryOutline>, DomainError>;
}
