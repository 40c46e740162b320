//! Domain layer for the Character context.

pub mod class;
pub mod player;
