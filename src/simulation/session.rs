// src/simulation/session.rs

//! One end-to-end teleportation run.
//!
//! A [`ProtocolSession`] owns the sender, the receiver, the classical channel
//! between them and a timeline of [`ProtocolEvent`]s. Running it schedules
//! the sender's start at time zero and dispatches events until the queue is
//! empty or the runtime horizon is reached.

use super::config::SessionParams;
use super::results::SessionRecord;
use super::timeline::{Scheduler, Timeline};
use super::transport::{hand_over, ChannelTransport, ClassicalChannel};
use crate::core::{
    EntangledPair, QuantumMemory, SimTime, TeleportError, TeleportResult, RECEIVER_EPR_MEMORY, SENDER_EPR_MEMORY,
    SENDER_UNKNOWN_MEMORY,
};
use crate::protocol::{
    OutcomeSampler, OutcomeSource, ProtocolEvent, Receiver, ReceiverPhase, Sender, SenderPhase,
};
use crate::trace::{ProtocolTrace, TraceStep};
use chrono::Utc;
use rand::RngExt;
use std::fmt;
use tracing::{info, warn};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Configured,
    Running,
    /// The receiver applied its corrections.
    Completed,
    /// The horizon was reached first; the receiver never corrected.
    Abandoned,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Configured => "Configured",
            SessionPhase::Running => "Running",
            SessionPhase::Completed => "Completed",
            SessionPhase::Abandoned => "Abandoned",
        };
        f.write_str(name)
    }
}

pub struct ProtocolSession {
    params: SessionParams,
    seed: Option<u64>,
    phase: SessionPhase,
    timeline: Timeline<ProtocolEvent>,
    sender: Sender,
    receiver: Receiver,
    channel: ClassicalChannel,
    source: Box<dyn OutcomeSource + Send>,
    record: Option<SessionRecord>,
}

impl ProtocolSession {
    /// Builds a session sampling outcomes from a seeded RNG. Without a seed in
    /// `params` one is drawn from the thread RNG and kept for the record.
    pub fn new(params: SessionParams) -> Self {
        let seed = params.seed.unwrap_or_else(|| rand::rng().random::<u64>());
        let mut session = Self::with_outcome_source(params, Box::new(OutcomeSampler::seeded(seed)));
        session.seed = Some(seed);
        session
    }

    /// Builds a session with an explicit outcome source, e.g. a forced outcome.
    pub fn with_outcome_source(params: SessionParams, source: Box<dyn OutcomeSource + Send>) -> Self {
        let (sender_half, receiver_half) =
            EntangledPair::create(params.bell_kind, SENDER_EPR_MEMORY, RECEIVER_EPR_MEMORY);
        let sender = Sender::new(
            params.sender.clone(),
            params.receiver.clone(),
            QuantumMemory::with_state(SENDER_UNKNOWN_MEMORY, params.initial_state),
            sender_half,
        );
        let receiver = Receiver::new(params.receiver.clone(), receiver_half, params.delay)
            .with_expected_sender(params.sender.clone());
        let channel = ClassicalChannel::new(
            format!("cc_{}_{}", params.sender.as_str(), params.receiver.as_str()),
            params.sender.clone(),
            params.receiver.clone(),
            params.channel_delay,
        );
        Self {
            seed: None,
            phase: SessionPhase::Configured,
            timeline: Timeline::with_stop_time(params.runtime),
            sender,
            receiver,
            channel,
            source,
            record: None,
            params,
        }
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    pub fn channel(&self) -> &ClassicalChannel {
        &self.channel
    }

    /// Events still queued past the horizon.
    pub fn pending_events(&self) -> usize {
        self.timeline.pending()
    }

    /// Record of the last run, if the session has run.
    pub fn record(&self) -> Option<&SessionRecord> {
        self.record.as_ref()
    }

    /// Runs the session to completion or to the runtime horizon.
    ///
    /// A session runs once; a second call fails with a protocol-state error.
    pub fn run(&mut self) -> TeleportResult<SessionRecord> {
        if self.phase != SessionPhase::Configured {
            return Err(TeleportError::protocol_state("session", self.phase, "a session can only run once"));
        }
        self.phase = SessionPhase::Running;
        info!(params = %self.params, "teleportation session started");

        // --- Dispatch ---
        // Split borrows: the handler drives both nodes while the timeline runs
        let Self { timeline, sender, receiver, channel, source, .. } = self;
        timeline.schedule(SimTime::ZERO, ProtocolEvent::StartTeleportation { sender: sender.id().clone() })?;
        timeline.run(|tl, event| match event {
            ProtocolEvent::StartTeleportation { sender: target } => {
                if &target != sender.id() {
                    return Err(TeleportError::Delivery { target, message: "no such sender in this session".into() });
                }
                // Bell measurement; the result leaves through the channel
                let now = tl.now();
                let mut transport = ChannelTransport::new(&*channel, tl, &mut *receiver);
                sender.start(now, &mut **source, &mut transport).map(|_| ())
            }
            // Delayed channel delivery
            ProtocolEvent::DeliverMessage(message) => hand_over(&mut *receiver, message, tl),
            ProtocolEvent::ApplyCorrections { receiver: target } => {
                if &target != receiver.id() {
                    return Err(TeleportError::Delivery { target, message: "no such receiver in this session".into() });
                }
                receiver.apply_corrections(tl.now()).map(|_| ())
            }
        })?;

        // --- Outcome ---
        // Anything still queued lies past the runtime horizon
        self.phase = if self.receiver.phase() == ReceiverPhase::Corrected {
            SessionPhase::Completed
        } else {
            warn!(
                receiver_phase = %self.receiver.phase(),
                pending = self.timeline.pending(),
                runtime = %self.params.runtime,
                "runtime horizon reached before the receiver corrected; session abandoned"
            );
            SessionPhase::Abandoned
        };

        let record = self.build_record();
        info!(phase = %self.phase, final_state = ?record.final_state, "teleportation session finished");
        self.record = Some(record.clone());
        Ok(record)
    }

    fn build_record(&self) -> SessionRecord {
        let teleported = self.receiver.teleported_state();
        SessionRecord {
            initial_state: self.params.initial_state,
            bell_state_type: self.params.bell_kind,
            measurement_results: self.sender.measurement_results(),
            final_state: teleported.map(|t| t.state),
            corrections_applied: teleported.map(|t| t.corrections.gates().to_vec()).unwrap_or_default(),
            runtime: self.params.runtime,
            delay: self.params.delay,
            channel_delay: self.params.channel_delay,
            timestamp: Utc::now(),
            seed: self.seed.or(self.params.seed),
            received_at: self.receiver.received_at(),
            corrected_at: teleported.map(|t| t.corrected_at),
        }
    }

    /// Timestamped steps reconstructed from the two state machines.
    pub fn trace(&self) -> ProtocolTrace {
        let mut trace = ProtocolTrace::new();
        let (sender_id, receiver_id) = (self.sender.id(), self.receiver.id());

        if self.sender.phase() != SenderPhase::Idle {
            if let (Some(at), Some(outcome)) = (self.sender.measured_at(), self.sender.measurement_results()) {
                trace.push(at, sender_id.clone(), TraceStep::Started);
                trace.push(at, sender_id.clone(), TraceStep::Measured { outcome });
                trace.push(
                    at,
                    sender_id.clone(),
                    TraceStep::Sent { to: receiver_id.clone(), arrives_at: at + self.channel.delay() },
                );
            }
        }
        if let (Some(at), Some(outcome)) = (self.receiver.received_at(), self.receiver.measurement_results()) {
            trace.push(at, receiver_id.clone(), TraceStep::Received { outcome });
        }
        if let Some(due) = self.receiver.correction_due() {
            if let Some(at) = self.receiver.received_at() {
                trace.push(at, receiver_id.clone(), TraceStep::CorrectionScheduled { due });
            }
        }
        if let Some(teleported) = self.receiver.teleported_state() {
            trace.push(
                teleported.corrected_at,
                receiver_id.clone(),
                TraceStep::Corrected { corrections: teleported.corrections, state: teleported.state },
            );
        }
        trace
    }
}

impl fmt::Debug for ProtocolSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolSession")
            .field("params", &self.params)
            .field("seed", &self.seed)
            .field("phase", &self.phase)
            .field("sender", &self.sender)
            .field("receiver", &self.receiver)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BellStateKind, MeasurementOutcome, QuantumStateTag};
    use crate::operations::{Correction, CorrectionSet};
    use crate::protocol::FixedOutcome;
    use crate::simulation::config::SessionConfig;

    fn params(state: QuantumStateTag, bell: BellStateKind) -> SessionParams {
        SessionConfig::new(state, bell).with_seed(11).validate().unwrap()
    }

    fn forced(params: SessionParams, b1: bool, b2: bool) -> ProtocolSession {
        ProtocolSession::with_outcome_source(params, Box::new(FixedOutcome(MeasurementOutcome::from_bits(b1, b2))))
    }

    #[test]
    fn test_plus_through_phi_plus_with_both_corrections() -> TeleportResult<()> {
        let mut session = forced(params(QuantumStateTag::Plus, BellStateKind::PhiPlus), true, true);
        let record = session.run()?;
        assert_eq!(session.phase(), SessionPhase::Completed);
        assert_eq!(record.corrections_applied, vec![Correction::X, Correction::Z]);
        assert_eq!(record.final_state, Some(QuantumStateTag::Plus));
        assert_eq!(session.receiver().teleported_state().map(|t| t.corrections), Some(CorrectionSet::XThenZ));
        Ok(())
    }

    #[test]
    fn test_delay_defers_correction() -> TeleportResult<()> {
        let mut p = params(QuantumStateTag::One, BellStateKind::PsiMinus);
        p.delay = SimTime::new(200);
        p.channel_delay = SimTime::new(50);
        let mut session = forced(p, false, false);
        let record = session.run()?;
        assert_eq!(record.received_at, Some(SimTime::new(50)));
        assert_eq!(record.corrected_at, Some(SimTime::new(250)));
        assert_eq!(record.corrections_applied, vec![Correction::X]);
        assert_eq!(record.final_state, Some(QuantumStateTag::One));

        let trace = session.trace();
        assert!(trace.find(|s| matches!(s, TraceStep::CorrectionScheduled { .. })).is_some());
        assert!(trace.entries().windows(2).all(|w| w[0].time <= w[1].time));
        Ok(())
    }

    #[test]
    fn test_horizon_abandons_session() -> TeleportResult<()> {
        let mut p = params(QuantumStateTag::Zero, BellStateKind::PhiPlus);
        p.runtime = SimTime::new(100);
        p.delay = SimTime::new(500);
        let mut session = forced(p, false, false);
        let record = session.run()?;
        assert_eq!(session.phase(), SessionPhase::Abandoned);
        assert_eq!(session.receiver().phase(), ReceiverPhase::CorrectionPending);
        assert_eq!(session.pending_events(), 1);
        assert!(record.measurement_results.is_some());
        assert_eq!(record.final_state, None);
        assert!(record.corrections_applied.is_empty());
        Ok(())
    }

    #[test]
    fn test_session_runs_once() -> TeleportResult<()> {
        let mut session = ProtocolSession::new(params(QuantumStateTag::Zero, BellStateKind::PhiPlus));
        session.run()?;
        assert!(matches!(session.run(), Err(TeleportError::ProtocolState { .. })));
        Ok(())
    }

    #[test]
    fn test_seeded_sessions_agree() -> TeleportResult<()> {
        let a = ProtocolSession::new(params(QuantumStateTag::Plus, BellStateKind::PhiPlus)).run()?;
        let b = ProtocolSession::new(params(QuantumStateTag::Plus, BellStateKind::PhiPlus)).run()?;
        assert_eq!(a.measurement_results, b.measurement_results);
        assert_eq!(a.seed, Some(11));
        Ok(())
    }
}
