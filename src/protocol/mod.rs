// src/protocol/mod.rs

//! Sender and receiver state machines, the classical message they exchange,
//! and the sources of Bell-measurement outcomes.

pub mod measurement;
pub mod message;
pub mod receiver;
pub mod sender;

pub use measurement::{sample_outcome, FixedOutcome, OutcomeSampler, OutcomeSource};
pub use message::{MessageType, ProtocolEvent, TeleportationMessage};
pub use receiver::{Receiver, ReceiverPhase, TeleportedState};
pub use sender::{Sender, SenderPhase};
