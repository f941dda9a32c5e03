// src/protocol/receiver.rs

//! The receiving side of the protocol.
//!
//! The receiver holds the far half of the pair. When the sender's two bits
//! arrive it resolves the correction set and applies it to that half, either
//! at once or after its configured delay.

use super::message::{ProtocolEvent, TeleportationMessage};
use crate::core::{MeasurementOutcome, NodeId, PairHalf, QuantumStateTag, SimTime, TeleportError, TeleportResult};
use crate::operations::{resolve, CorrectionSet};
use crate::simulation::timeline::Scheduler;
use std::fmt;
use tracing::debug;

/// Lifecycle of a [`Receiver`]. `Corrected` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiverPhase {
    Waiting,
    /// A result arrived; corrections are scheduled for later.
    CorrectionPending,
    Corrected,
}

impl fmt::Display for ReceiverPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReceiverPhase::Waiting => "Waiting",
            ReceiverPhase::CorrectionPending => "CorrectionPending",
            ReceiverPhase::Corrected => "Corrected",
        };
        f.write_str(name)
    }
}

/// The recovered state together with the corrections that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeleportedState {
    pub state: QuantumStateTag,
    pub corrections: CorrectionSet,
    pub corrected_at: SimTime,
}

impl fmt::Display for TeleportedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} after {} at {}", self.state, self.corrections, self.corrected_at)
    }
}

#[derive(Debug)]
pub struct Receiver {
    id: NodeId,
    expected_sender: Option<NodeId>,
    memory_epr: PairHalf,
    delay: SimTime,
    phase: ReceiverPhase,
    measurement_results: Option<MeasurementOutcome>,
    received_at: Option<SimTime>,
    correction_due: Option<SimTime>,
    teleported_state: Option<TeleportedState>,
}

impl Receiver {
    /// A receiver that corrects `delay` after a result arrives.
    pub fn new(id: NodeId, memory_epr: PairHalf, delay: SimTime) -> Self {
        Self {
            id,
            expected_sender: None,
            memory_epr,
            delay,
            phase: ReceiverPhase::Waiting,
            measurement_results: None,
            received_at: None,
            correction_due: None,
            teleported_state: None,
        }
    }

    /// Only accept results from `sender`.
    pub fn with_expected_sender(mut self, sender: NodeId) -> Self {
        self.expected_sender = Some(sender);
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn phase(&self) -> ReceiverPhase {
        self.phase
    }

    pub fn delay(&self) -> SimTime {
        self.delay
    }

    pub fn memory_epr(&self) -> &PairHalf {
        &self.memory_epr
    }

    pub fn measurement_results(&self) -> Option<MeasurementOutcome> {
        self.measurement_results
    }

    pub fn received_at(&self) -> Option<SimTime> {
        self.received_at
    }

    /// When a deferred correction is due, if one was scheduled.
    pub fn correction_due(&self) -> Option<SimTime> {
        self.correction_due
    }

    /// Final state; `None` until `Corrected`.
    pub fn teleported_state(&self) -> Option<&TeleportedState> {
        self.teleported_state.as_ref()
    }

    /// Handles the sender's classical message.
    ///
    /// Valid only while `Waiting`. With no delay the corrections are applied in
    /// the same instant; otherwise an `ApplyCorrections` event is scheduled at
    /// `now + delay`.
    pub fn on_message<S>(&mut self, message: TeleportationMessage, scheduler: &mut S) -> TeleportResult<()>
    where
        S: Scheduler<Event = ProtocolEvent> + ?Sized,
    {
        if self.phase != ReceiverPhase::Waiting {
            return Err(TeleportError::protocol_state(
                "receiver",
                self.phase,
                "a measurement result was already received",
            ));
        }
        if message.receiver != self.id {
            return Err(TeleportError::Delivery {
                target: message.receiver,
                message: format!("message reached {} instead", self.id),
            });
        }
        if let Some(expected) = &self.expected_sender {
            if &message.sender != expected {
                return Err(TeleportError::Delivery {
                    target: self.id.clone(),
                    message: format!("unexpected sender {}, expected {}", message.sender, expected),
                });
            }
        }

        let now = scheduler.now();
        debug!(receiver = %self.id, outcome = %message.measurement_results, %now, "measurement result received");

        if self.delay.is_zero() {
            self.measurement_results = Some(message.measurement_results);
            self.received_at = Some(now);
            if let Err(err) = self.apply_corrections(now).map(|_| ()) {
                // Nothing was applied; leave the receiver as it was
                self.measurement_results = None;
                self.received_at = None;
                return Err(err);
            }
        } else {
            // Schedule first so a failed schedule leaves no partial state behind
            let due = scheduler.schedule_after(self.delay, ProtocolEvent::ApplyCorrections { receiver: self.id.clone() })?;
            self.measurement_results = Some(message.measurement_results);
            self.received_at = Some(now);
            self.correction_due = Some(due);
            self.phase = ReceiverPhase::CorrectionPending;
            debug!(receiver = %self.id, %due, "corrections scheduled");
        }
        Ok(())
    }

    /// Resolves and applies the corrections for the received outcome.
    ///
    /// A deferred correction cannot be applied before its due time.
    pub fn apply_corrections(&mut self, now: SimTime) -> TeleportResult<&TeleportedState> {
        if self.phase == ReceiverPhase::Corrected {
            return Err(TeleportError::protocol_state(
                "receiver",
                self.phase,
                "corrections were already applied",
            ));
        }
        if let Some(due) = self.correction_due {
            if now < due {
                return Err(TeleportError::protocol_state(
                    "receiver",
                    self.phase,
                    format!("corrections are due at {}, not {}", due, now),
                ));
            }
        }
        let outcome = self.measurement_results.ok_or_else(|| {
            TeleportError::protocol_state(
                "receiver",
                self.phase,
                "apply_corrections() called before any measurement result arrived",
            )
        })?;
        let collapsed = self.memory_epr.collapsed_state().ok_or_else(|| {
            TeleportError::protocol_state(
                "receiver",
                self.phase,
                format!("pair half in {} was never measured by the sender", self.memory_epr.memory_name()),
            )
        })?;

        let corrections = resolve(self.memory_epr.kind(), outcome);
        let state = corrections.apply(collapsed);
        self.phase = ReceiverPhase::Corrected;
        debug!(receiver = %self.id, %corrections, %state, %now, "corrections applied");
        Ok(&*self.teleported_state.insert(TeleportedState { state, corrections, corrected_at: now }))
    }
}

impl fmt::Display for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Receiver({}, phase: {}", self.id, self.phase)?;
        if let Some(teleported) = &self.teleported_state {
            write!(f, ", state: {}", teleported.state)?;
        }
        write!(f, ")")
    }
}
