//! Sagaforge — Inventory bounded context.
//!
//! Responsible for the ordered, duplicate-free item lists carried by
//! party members.

pub mod domain;

pub use domain::inventory::Inventory;
