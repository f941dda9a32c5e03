//! Error handling logic

use super::time::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Name of a network node taking part in a teleportation session.
/// Its uniqueness is context-dependent: a session wires exactly one
/// sender and one receiver, and messages are addressed by this name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Creates a node identifier from any string-like name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrows the node name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Result alias used throughout the crate.
pub type TeleportResult<T> = Result<T, TeleportError>;

/// Failures that can arise while configuring or running a teleportation session.
///
/// None of these are transient: the classical channel is assumed reliable, so
/// every error is surfaced immediately to the caller and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeleportError {
    /// Invalid session parameters (bell type, timing, initial state, config file).
    /// The session is never constructed.
    #[error("Configuration Error: {message}")]
    Configuration {
        /// Configuration failure message
        message: String,
    },

    /// An operation was invoked in a state that does not allow it,
    /// e.g. starting a sender twice or correcting before a measurement arrived.
    #[error("Protocol State Violation ({role} in state {state}): {message}")]
    ProtocolState {
        /// Which side of the protocol raised the error
        role: &'static str,
        /// Name of the offending state
        state: String,
        /// ProtocolState failure message
        message: String,
    },

    /// The addressed receiver is not wired to this channel.
    #[error("Delivery Failure ({target}): {message}")]
    Delivery {
        /// Node the message was addressed to
        target: NodeId,
        /// Delivery failure message
        message: String,
    },

    /// An event was scheduled before the current simulation time.
    #[error("Schedule Violation: cannot schedule an event at {at}, timeline is already at {now}")]
    Schedule {
        /// Requested event time
        at: SimTime,
        /// Current timeline time
        now: SimTime,
    },

    /// Encoding or decoding of the export document failed.
    #[error("Export Error: {message}")]
    Export {
        /// Export failure message
        message: String,
    },
}

impl TeleportError {
    /// Shorthand for a [`TeleportError::Configuration`].
    pub fn config(message: impl Into<String>) -> Self {
        TeleportError::Configuration { message: message.into() }
    }

    /// Shorthand for a [`TeleportError::ProtocolState`].
    pub fn protocol_state(role: &'static str, state: impl fmt::Display, message: impl Into<String>) -> Self {
        TeleportError::ProtocolState {
            role,
            state: state.to_string(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for TeleportError {
    fn from(err: serde_json::Error) -> Self {
        TeleportError::Export { message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_offending_state() {
        let err = TeleportError::protocol_state("sender", "ResultSent", "start() called twice");
        let text = err.to_string();
        assert!(text.contains("sender"));
        assert!(text.contains("ResultSent"));
        assert!(text.contains("start() called twice"));
    }

    #[test]
    fn test_schedule_error_shows_times() {
        let err = TeleportError::Schedule { at: SimTime::new(5), now: SimTime::new(10) };
        assert_eq!(
            err.to_string(),
            "Schedule Violation: cannot schedule an event at 5ps, timeline is already at 10ps"
        );
    }
}
