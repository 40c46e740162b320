//! Domain layer for the World context.

pub mod catalog;
pub mod world;
