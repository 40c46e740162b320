//! Domain layer for the Inventory context.

pub mod inventory;
