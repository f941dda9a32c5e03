// src/protocol/message.rs

use crate::core::{MeasurementOutcome, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag carried by every classical message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    MeasurementResults,
}

/// Classical message from sender to receiver carrying the two measurement bits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeleportationMessage {
    pub msg_type: MessageType,
    pub sender: NodeId,
    pub receiver: NodeId,
    pub measurement_results: MeasurementOutcome,
}

impl TeleportationMessage {
    pub fn measurement_results(sender: NodeId, receiver: NodeId, outcome: MeasurementOutcome) -> Self {
        Self {
            msg_type: MessageType::MeasurementResults,
            sender,
            receiver,
            measurement_results: outcome,
        }
    }
}

impl fmt::Display for TeleportationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TeleportationMessage(MEASUREMENT_RESULTS, {} -> {}, results={})",
            self.sender, self.receiver, self.measurement_results
        )
    }
}

/// Commands dispatched by the session when the timeline reaches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    /// Kick off the sender's Bell measurement.
    StartTeleportation { sender: NodeId },
    /// A classical message reaching the end of a delayed channel.
    DeliverMessage(TeleportationMessage),
    /// The receiver's deferred correction step.
    ApplyCorrections { receiver: NodeId },
}
