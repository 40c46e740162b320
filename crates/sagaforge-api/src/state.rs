//! Shared application state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sagaforge_core::clock::Clock;
use sagaforge_core::repository::SessionRepository;
use sagaforge_core::rng::DeterministicRng;
use sagaforge_narrative::{Narrator, OutlineGenerator};
use sagaforge_session::application::store::SessionStore;
use sagaforge_world::WorldCatalog;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for timestamps.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// RNG for dice rolls; locked only around the synchronous roll.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Live sessions with per-session locking.
    pub store: Arc<SessionStore>,
    /// Turn narrator.
    pub narrator: Arc<dyn Narrator>,
    /// Story outline generator.
    pub outline_generator: Arc<dyn OutlineGenerator>,
    /// Worlds players can choose from.
    pub worlds: Arc<WorldCatalog>,
    /// Upper bound on a single narrator or outline call.
    pub narrator_timeout: Duration,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .field("worlds", &self.worlds.worlds().len())
            .field("narrator_timeout", &self.narrator_timeout)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        repository: Arc<dyn SessionRepository>,
        narrator: Arc<dyn Narrator>,
        outline_generator: Arc<dyn OutlineGenerator>,
        worlds: WorldCatalog,
        narrator_timeout: Duration,
    ) -> Self {
        Self {
            clock,
            rng,
            store: Arc::new(SessionStore::new(repository)),
            narrator,
            outline_generator,
            worlds: Arc::new(worlds),
            narrator_timeout,
        }
    }
}
