// src/simulation/mod.rs

//! Runs teleportation sessions on a discrete-event timeline.
//! This module contains the `Simulator` entry point, the timeline and
//! transport the protocol runs on, and the record each session produces.

pub mod batch;
pub mod config;
mod results;
pub mod scenarios;
pub mod session;
pub mod timeline;
pub mod transport;

pub use batch::BatchRunner;
pub use config::{SessionConfig, SessionParams};
pub use results::SessionRecord;
pub use scenarios::{run_suite, Scenario, ScenarioOutcome, ScenarioSuite, SuiteReport};
pub use session::{ProtocolSession, SessionPhase};
pub use timeline::{Scheduler, Timeline};
pub use transport::{ChannelTransport, ClassicalChannel, Transport};

use crate::core::TeleportResult;
use crate::protocol::OutcomeSource;

/// Entry point for running sessions from raw configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct Simulator {
    batch: BatchRunner,
}

impl Simulator {
    /// Creates a new Simulator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a dedicated pool of `threads` workers for batches.
    pub fn with_threads(threads: usize) -> Self {
        Self { batch: BatchRunner::with_threads(threads) }
    }

    /// Validates `config` and runs one session.
    ///
    /// # Returns
    /// * `Ok(SessionRecord)` for completed and abandoned sessions alike; an
    ///   abandoned one has no final state.
    /// * `Err(TeleportError)` for invalid configuration or a protocol violation.
    pub fn run(&self, config: &SessionConfig) -> TeleportResult<SessionRecord> {
        ProtocolSession::new(config.validate()?).run()
    }

    /// Like [`Simulator::run`], but measurement outcomes come from `source`.
    pub fn run_with_source(
        &self,
        config: &SessionConfig,
        source: Box<dyn OutcomeSource + Send>,
    ) -> TeleportResult<SessionRecord> {
        ProtocolSession::with_outcome_source(config.validate()?, source).run()
    }

    /// Runs one session per configuration in parallel.
    pub fn run_batch(&self, configs: &[SessionConfig]) -> TeleportResult<Vec<SessionRecord>> {
        self.batch.run(configs)
    }

    /// Runs `runs` seeded repetitions of `config` in parallel.
    pub fn repeat(&self, config: &SessionConfig, runs: usize, base_seed: u64) -> TeleportResult<Vec<SessionRecord>> {
        self.batch.repeat(config, runs, base_seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BellStateKind, MeasurementOutcome, QuantumStateTag, TeleportError};
    use crate::operations::Correction;
    use crate::protocol::FixedOutcome;

    #[test]
    fn test_run_rejects_bad_config() {
        let config = SessionConfig { runtime: -1, ..SessionConfig::default() };
        assert!(matches!(Simulator::new().run(&config), Err(TeleportError::Configuration { .. })));
    }

    #[test]
    fn test_forced_psi_minus_zero_zero() -> TeleportResult<()> {
        let config = SessionConfig::new(QuantumStateTag::Zero, BellStateKind::PsiMinus);
        let record = Simulator::new()
            .run_with_source(&config, Box::new(FixedOutcome(MeasurementOutcome::from_bits(false, false))))?;
        assert_eq!(record.corrections_applied, vec![Correction::X]);
        assert_eq!(record.final_state, Some(QuantumStateTag::Zero));
        Ok(())
    }

    #[test]
    fn test_every_state_and_bell_kind_round_trips() -> TeleportResult<()> {
        let simulator = Simulator::new();
        for state in QuantumStateTag::ALL {
            for bell in BellStateKind::ALL {
                for seed in 0..8 {
                    let record = simulator.run(&SessionConfig::new(state, bell).with_seed(seed))?;
                    assert_eq!(record.final_state, Some(state), "{} via {} seed {}", state, bell, seed);
                }
            }
        }
        Ok(())
    }
}
