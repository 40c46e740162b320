//! Domain layer for the Session & Progress context.

pub mod commands;
pub mod reducer;
pub mod state;
