//! Shared test mocks and utilities for the Sagaforge session engine.

mod clock;
mod repository;
mod rng;

pub use clock::{FixedClock, fixed_clock};
pub use repository::{FailingSessionRepository, RecordingSessionRepository};
pub use rng::{MockRng, SequenceRng};
