//! Sagaforge — Session & Progress bounded context.
//!
//! Responsible for the authoritative state of each play session: the
//! reducer that folds validated narrator effects into it, the store that
//! serializes turns per session, and the command handlers that walk a
//! session through its lifecycle.

pub mod application;
pub mod domain;
