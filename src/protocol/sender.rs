// src/protocol/sender.rs

//! The sending side of the protocol.
//!
//! The sender owns the memory holding the unknown state and its half of the
//! pre-shared pair. Starting it performs the Bell measurement, which consumes
//! the unknown state, and hands the two classical bits to the transport.

use super::measurement::OutcomeSource;
use super::message::TeleportationMessage;
use crate::core::{MeasurementOutcome, NodeId, PairHalf, QuantumMemory, SimTime, TeleportError, TeleportResult};
use crate::operations::resolve;
use crate::simulation::transport::Transport;
use std::fmt;
use tracing::debug;

/// Lifecycle of a [`Sender`]. `ResultSent` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SenderPhase {
    Idle,
    Measuring,
    ResultSent,
}

impl fmt::Display for SenderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SenderPhase::Idle => "Idle",
            SenderPhase::Measuring => "Measuring",
            SenderPhase::ResultSent => "ResultSent",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct Sender {
    id: NodeId,
    receiver: NodeId,
    memory_unknown: QuantumMemory,
    memory_epr: PairHalf,
    phase: SenderPhase,
    measurement_results: Option<MeasurementOutcome>,
    measured_at: Option<SimTime>,
}

impl Sender {
    /// Wires a sender to the node it will report to.
    pub fn new(id: NodeId, receiver: NodeId, memory_unknown: QuantumMemory, memory_epr: PairHalf) -> Self {
        Self {
            id,
            receiver,
            memory_unknown,
            memory_epr,
            phase: SenderPhase::Idle,
            measurement_results: None,
            measured_at: None,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn receiver(&self) -> &NodeId {
        &self.receiver
    }

    pub fn phase(&self) -> SenderPhase {
        self.phase
    }

    /// The two bits of the Bell measurement; `None` until the measurement completes.
    pub fn measurement_results(&self) -> Option<MeasurementOutcome> {
        self.measurement_results
    }

    /// Time the measurement was taken and the result handed to the transport.
    pub fn measured_at(&self) -> Option<SimTime> {
        self.measured_at
    }

    pub fn memory_unknown(&self) -> &QuantumMemory {
        &self.memory_unknown
    }

    pub fn memory_epr(&self) -> &PairHalf {
        &self.memory_epr
    }

    /// Runs the sender: measure, record, send.
    ///
    /// Only valid from `Idle`. The outcome is written once and never changes;
    /// a transport failure is returned as-is and leaves the sender in
    /// `ResultSent` with the outcome recorded.
    pub fn start(
        &mut self,
        now: SimTime,
        source: &mut dyn OutcomeSource,
        transport: &mut dyn Transport,
    ) -> TeleportResult<MeasurementOutcome> {
        if self.phase != SenderPhase::Idle {
            return Err(TeleportError::protocol_state(
                "sender",
                self.phase,
                "start() is only valid once, from Idle",
            ));
        }
        self.phase = SenderPhase::Measuring;
        debug!(sender = %self.id, %now, "starting Bell measurement");

        let outcome = self.perform_bell_measurement(source)?;
        self.measurement_results = Some(outcome);
        self.measured_at = Some(now);
        self.phase = SenderPhase::ResultSent;
        debug!(sender = %self.id, %outcome, "measurement recorded, sending result");

        let message = TeleportationMessage::measurement_results(self.id.clone(), self.receiver.clone(), outcome);
        transport.deliver(message)?;
        Ok(outcome)
    }

    fn perform_bell_measurement(&mut self, source: &mut dyn OutcomeSource) -> TeleportResult<MeasurementOutcome> {
        let unknown = self.memory_unknown.take().ok_or_else(|| {
            TeleportError::protocol_state(
                "sender",
                self.phase,
                format!("memory {} holds no state to teleport", self.memory_unknown.name()),
            )
        })?;
        let outcome = source.sample_outcome();
        // The far half is left in the unknown state with the Pauli byproduct
        // that the matching correction set undoes.
        let byproduct = resolve(self.memory_epr.kind(), outcome).undo(unknown);
        self.memory_epr.collapse(byproduct)?;
        Ok(outcome)
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sender({}, phase: {}", self.id, self.phase)?;
        if let Some(outcome) = self.measurement_results {
            write!(f, ", results: {}", outcome)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BellStateKind, EntangledPair, QuantumStateTag};
    use crate::protocol::measurement::FixedOutcome;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Vec<TeleportationMessage>,
    }

    impl Transport for RecordingTransport {
        fn deliver(&mut self, message: TeleportationMessage) -> TeleportResult<()> {
            self.sent.push(message);
            Ok(())
        }
    }

    fn sender(kind: BellStateKind, state: QuantumStateTag) -> (Sender, PairHalf) {
        let (alice, bob) = EntangledPair::create(kind, "sender_epr", "receiver_epr");
        let sender = Sender::new(
            NodeId::from("alice"),
            NodeId::from("bob"),
            QuantumMemory::with_state("sender_unknown", state),
            alice,
        );
        (sender, bob)
    }

    #[test]
    fn test_start_sends_exactly_one_message() -> TeleportResult<()> {
        let (mut alice, _bob) = sender(BellStateKind::PhiPlus, QuantumStateTag::Plus);
        let forced = MeasurementOutcome::from_bits(true, false);
        let mut transport = RecordingTransport::default();

        let outcome = alice.start(SimTime::new(3), &mut FixedOutcome(forced), &mut transport)?;

        assert_eq!(outcome, forced);
        assert_eq!(alice.phase(), SenderPhase::ResultSent);
        assert_eq!(alice.measurement_results(), Some(forced));
        assert_eq!(alice.measured_at(), Some(SimTime::new(3)));
        assert_eq!(transport.sent.len(), 1);
        assert_eq!(transport.sent[0].receiver, NodeId::from("bob"));
        assert_eq!(transport.sent[0].measurement_results, forced);
        Ok(())
    }

    #[test]
    fn test_measurement_consumes_unknown_state() -> TeleportResult<()> {
        let (mut alice, bob) = sender(BellStateKind::PhiPlus, QuantumStateTag::One);
        let mut transport = RecordingTransport::default();
        alice.start(SimTime::ZERO, &mut FixedOutcome(MeasurementOutcome::from_bits(false, true)), &mut transport)?;
        assert_eq!(alice.memory_unknown().state(), None);
        // X byproduct on |1⟩
        assert_eq!(bob.collapsed_state(), Some(QuantumStateTag::Zero));
        Ok(())
    }

    #[test]
    fn test_second_start_is_rejected() -> TeleportResult<()> {
        let (mut alice, _bob) = sender(BellStateKind::PsiMinus, QuantumStateTag::Zero);
        let mut source = FixedOutcome(MeasurementOutcome::from_bits(false, false));
        let mut transport = RecordingTransport::default();
        alice.start(SimTime::ZERO, &mut source, &mut transport)?;

        let err = alice.start(SimTime::ZERO, &mut source, &mut transport).unwrap_err();
        match err {
            TeleportError::ProtocolState { role, state, .. } => {
                assert_eq!(role, "sender");
                assert_eq!(state, "ResultSent");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(transport.sent.len(), 1);
        Ok(())
    }

    #[test]
    fn test_results_empty_before_start() {
        let (alice, _bob) = sender(BellStateKind::PhiPlus, QuantumStateTag::Zero);
        assert_eq!(alice.phase(), SenderPhase::Idle);
        assert_eq!(alice.measurement_results(), None);
    }
}
