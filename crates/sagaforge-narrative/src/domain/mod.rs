//! Domain layer for the Narrative context.

pub mod context;
pub mod effects;
pub mod outline;
pub mod transcript;
