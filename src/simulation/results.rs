// src/simulation/results.rs
use crate::core::{BellStateKind, MeasurementOutcome, QuantumStateTag, SimTime};
use crate::operations::{Correction, CorrectionSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one teleportation session.
///
/// This is the record the reporting, export and validation layers consume.
/// `measurement_results`, `final_state` and the correction list are only
/// populated for the parts of the protocol that actually ran before the
/// timeline horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub initial_state: QuantumStateTag,
    pub bell_state_type: BellStateKind,
    pub measurement_results: Option<MeasurementOutcome>,
    pub final_state: Option<QuantumStateTag>,
    /// Gates in the order they were applied.
    #[serde(default)]
    pub corrections_applied: Vec<Correction>,
    pub runtime: SimTime,
    pub delay: SimTime,
    #[serde(default)]
    pub channel_delay: SimTime,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<SimTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_at: Option<SimTime>,
}

impl SessionRecord {
    /// Whether the receiver finished correcting before the horizon.
    pub fn is_complete(&self) -> bool {
        self.final_state.is_some()
    }

    /// The correction set the record's gate list corresponds to.
    pub fn corrections(&self) -> Option<CorrectionSet> {
        CorrectionSet::from_gates(&self.corrections_applied)
    }

    /// `runtime + delay`, as the dashboard reports it.
    pub fn total_time(&self) -> SimTime {
        self.runtime + self.delay
    }

    /// Fidelity between the initial and the teleported state; 0.0 if the
    /// session never completed.
    pub fn fidelity(&self) -> f64 {
        self.final_state.map_or(0.0, |final_state| self.initial_state.fidelity(final_state))
    }

    /// Completed with a perfect copy of the initial state.
    pub fn is_success(&self) -> bool {
        self.final_state == Some(self.initial_state)
    }
}

impl fmt::Display for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Teleportation Results:")?;
        writeln!(f, "  Initial state:       {}", self.initial_state)?;
        writeln!(f, "  Bell state:          {}", self.bell_state_type)?;
        match self.measurement_results {
            Some(outcome) => writeln!(f, "  Measurement results: {}", outcome)?,
            None => writeln!(f, "  Measurement results: none")?,
        }
        let gates: Vec<String> = self.corrections_applied.iter().map(|g| g.to_string()).collect();
        writeln!(f, "  Corrections applied: [{}]", gates.join(", "))?;
        match self.final_state {
            Some(state) => writeln!(f, "  Final state:         {}", state)?,
            None => writeln!(f, "  Final state:         none (receiver still waiting)")?,
        }
        writeln!(
            f,
            "  Runtime: {}, delay: {}, channel delay: {}",
            self.runtime, self.delay, self.channel_delay
        )?;
        write!(f, "  Fidelity: {:.4}", self.fidelity())
    }
}
