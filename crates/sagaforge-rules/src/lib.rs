//! Sagaforge — Rules & Resolution bounded context.
//!
//! Responsible for reading player intent out of free-text actions and
//! binding a d20 roll to the matching character statistic.

pub mod application;
pub mod domain;

pub use domain::dice::{Attribute, DiceRoll, RollTier, resolve};
pub use domain::keywords::{ActionCategory, classify_action};
