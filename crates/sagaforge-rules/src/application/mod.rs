//! Application layer for the Rules context.

pub mod resolver;
