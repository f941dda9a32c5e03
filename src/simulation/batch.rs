// src/simulation/batch.rs

//! Independent sessions run in parallel.
//!
//! Each session owns its sender, receiver and RNG, so the only shared
//! state is the read-only list of configurations.

use super::config::{SessionConfig, SessionParams};
use super::results::SessionRecord;
use super::session::ProtocolSession;
use crate::core::{TeleportError, TeleportResult};
use rayon::prelude::*;
use tracing::info;

/// Runs many sessions at once on a rayon pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchRunner {
    threads: Option<usize>,
}

impl BatchRunner {
    /// Runner on rayon's global pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner on a dedicated pool of `threads` workers.
    pub fn with_threads(threads: usize) -> Self {
        Self { threads: Some(threads) }
    }

    /// Validates every configuration, then runs one session per entry.
    /// Records come back in input order. Fails before running anything if
    /// any configuration is invalid.
    pub fn run(&self, configs: &[SessionConfig]) -> TeleportResult<Vec<SessionRecord>> {
        let params = configs.iter().map(SessionConfig::validate).collect::<TeleportResult<Vec<_>>>()?;
        info!(sessions = params.len(), threads = ?self.threads, "running session batch");
        self.install(|| run_all(&params))
    }

    /// `runs` sessions of the same configuration; session `i` is seeded with
    /// `base_seed + i` so the batch is reproducible.
    pub fn repeat(&self, config: &SessionConfig, runs: usize, base_seed: u64) -> TeleportResult<Vec<SessionRecord>> {
        let configs: Vec<SessionConfig> = (0..runs as u64)
            .map(|i| config.clone().with_seed(base_seed.wrapping_add(i)))
            .collect();
        self.run(&configs)
    }

    fn install<T, F>(&self, job: F) -> TeleportResult<T>
    where
        F: FnOnce() -> TeleportResult<T> + Send,
        T: Send,
    {
        match self.threads {
            None => job(),
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| TeleportError::config(format!("cannot start {} worker threads: {}", threads, e)))?;
                pool.install(job)
            }
        }
    }
}

fn run_all(params: &[SessionParams]) -> TeleportResult<Vec<SessionRecord>> {
    params
        .par_iter()
        .map(|p| ProtocolSession::new(p.clone()).run())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BellStateKind, QuantumStateTag};

    #[test]
    fn test_repeat_is_reproducible() -> TeleportResult<()> {
        let config = SessionConfig::new(QuantumStateTag::Plus, BellStateKind::PhiPlus);
        let a = BatchRunner::with_threads(2).repeat(&config, 32, 1_000)?;
        let b = BatchRunner::new().repeat(&config, 32, 1_000)?;
        assert_eq!(a.len(), 32);
        let outcomes_a: Vec<_> = a.iter().map(|r| r.measurement_results).collect();
        let outcomes_b: Vec<_> = b.iter().map(|r| r.measurement_results).collect();
        assert_eq!(outcomes_a, outcomes_b);
        assert_eq!(a[5].seed, Some(1_005));
        assert!(a.iter().all(|r| r.is_success()));
        Ok(())
    }

    #[test]
    fn test_invalid_config_fails_whole_batch() {
        let good = SessionConfig::default();
        let bad = SessionConfig { bell_state_type: 2, ..SessionConfig::default() };
        assert!(matches!(BatchRunner::new().run(&[good, bad]), Err(TeleportError::Configuration { .. })));
    }
}
