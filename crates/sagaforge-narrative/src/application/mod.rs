//! Application layer for the Narrative context.

pub mod narrator;
pub mod scripted;
