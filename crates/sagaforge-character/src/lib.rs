//! Sagaforge — Character bounded context.
//!
//! Responsible for the static class registry (base stats and starting
//! kit) and the party member record whose vitals the session reducer
//! keeps within bounds.

pub mod domain;

pub use domain::class::{CharacterClass, Stats, starting_inventory, stats_for};
pub use domain::player::Player;
