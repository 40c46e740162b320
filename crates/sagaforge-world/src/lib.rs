//! Sagaforge — World bounded context.
//!
//! Responsible for the read-only setting descriptors a session is played
//! in, and the catalog players choose them from.

pub mod domain;

pub use domain::catalog::WorldCatalog;
pub use domain::world::World;
