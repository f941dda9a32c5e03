// src/core/mod.rs

//! Core data structures and types

pub mod bell;
pub mod error;
pub mod memory;
pub mod outcome;
pub mod state;
pub mod time;

pub use bell::BellStateKind;
pub use error::{NodeId, TeleportError, TeleportResult};
pub use memory::{EntangledPair, PairEnd, PairHalf, QuantumMemory};
pub use outcome::MeasurementOutcome;
pub use state::{fidelity, QuantumStateTag};
pub use time::SimTime;

pub mod constants;
pub use constants::protocol_constants::*;
