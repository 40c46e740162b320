//! Domain layer for the Rules context.

pub mod dice;
pub mod keywords;
