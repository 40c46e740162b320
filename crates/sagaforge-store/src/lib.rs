//! Durable store adapters for the Sagaforge session engine.
//!
//! Both implement `SessionRepository`: an in-memory map for tests and
//! single-process runs, and a directory of JSON documents that survives
//! restarts.

mod file_session_repository;
mod memory_session_repository;

pub use file_session_repository::FileSessionRepository;
pub use memory_session_repository::InMemorySessionRepository;
