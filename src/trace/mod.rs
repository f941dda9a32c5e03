// src/trace/mod.rs

//! Ordered, timestamped log of what happened during one session.
//!
//! The trace is assembled from the state machines after the timeline has
//! run, so the protocol path itself carries no logging state. Its `Display`
//! renders a table followed by a two-lane diagram in the style of a circuit
//! drawing: one lane per node, one column per step.

use crate::core::{MeasurementOutcome, NodeId, QuantumStateTag, SimTime};
use crate::operations::CorrectionSet;
use std::fmt;

/// One protocol step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceStep {
    /// The sender was triggered.
    Started,
    /// Bell measurement on the sender's two memories.
    Measured { outcome: MeasurementOutcome },
    /// Result handed to the classical channel.
    Sent { to: NodeId, arrives_at: SimTime },
    /// Result reached the receiver.
    Received { outcome: MeasurementOutcome },
    /// Correction deferred by the receiver's delay.
    CorrectionScheduled { due: SimTime },
    /// Corrections applied; the teleported state is final.
    Corrected { corrections: CorrectionSet, state: QuantumStateTag },
}

impl TraceStep {
    /// Short symbol used in the lane diagram.
    fn symbol(&self) -> String {
        match self {
            TraceStep::Started => "▶".to_string(),
            TraceStep::Measured { .. } => "M".to_string(),
            TraceStep::Sent { .. } => "@".to_string(),
            TraceStep::Received { .. } => "●".to_string(),
            TraceStep::CorrectionScheduled { .. } => "…".to_string(),
            TraceStep::Corrected { corrections, .. } if corrections.is_empty() => "I".to_string(),
            TraceStep::Corrected { corrections, .. } => {
                corrections.gates().iter().map(|g| g.to_string()).collect::<Vec<_>>().join("")
            }
        }
    }
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceStep::Started => write!(f, "teleportation started"),
            TraceStep::Measured { outcome } => write!(f, "Bell measurement -> {}", outcome),
            TraceStep::Sent { to, arrives_at } => write!(f, "result sent to {}, arrives at {}", to, arrives_at),
            TraceStep::Received { outcome } => write!(f, "result {} received", outcome),
            TraceStep::CorrectionScheduled { due } => write!(f, "corrections scheduled for {}", due),
            TraceStep::Corrected { corrections, state } => write!(f, "applied {} -> {}", corrections, state),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub time: SimTime,
    pub node: NodeId,
    pub step: TraceStep,
}

/// The steps of one session in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolTrace {
    entries: Vec<TraceEntry>,
}

impl ProtocolTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step. Entries must be pushed in nondecreasing time order.
    pub fn push(&mut self, time: SimTime, node: NodeId, step: TraceStep) {
        debug_assert!(self.entries.last().is_none_or(|last| last.time <= time));
        self.entries.push(TraceEntry { time, node, step });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&TraceStep) -> bool) -> Option<&TraceEntry> {
        self.entries.iter().find(|e| predicate(&e.step))
    }

    /// Distinct nodes in order of first appearance.
    fn lanes(&self) -> Vec<&NodeId> {
        let mut lanes: Vec<&NodeId> = Vec::new();
        for entry in &self.entries {
            if !lanes.contains(&&entry.node) {
                lanes.push(&entry.node);
            }
        }
        lanes
    }
}

impl fmt::Display for ProtocolTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return writeln!(f, "ProtocolTrace[0 steps]");
        }

        // --- Step Table ---
        writeln!(f, "ProtocolTrace[{} steps]", self.entries.len())?;
        let time_width = self.entries.iter().map(|e| e.time.to_string().len()).max().unwrap_or(0);
        let node_width = self.entries.iter().map(|e| e.node.to_string().len()).max().unwrap_or(0);
        for entry in &self.entries {
            writeln!(
                f,
                "  {:>tw$}  {:<nw$}  {}",
                entry.time.to_string(),
                entry.node.to_string(),
                entry.step,
                tw = time_width,
                nw = node_width
            )?;
        }

        // --- Lane Diagram Setup ---
        const STEP_WIDTH: usize = 7;
        const H_WIRE: char = '─';
        const V_WIRE: char = '│';

        fn format_step(symbol: &str) -> String {
            let len = symbol.chars().count();
            if len >= STEP_WIDTH {
                return symbol.chars().take(STEP_WIDTH).collect();
            }
            let dashes = STEP_WIDTH - len;
            let pre = dashes / 2;
            format!("{}{}{}", H_WIRE.to_string().repeat(pre), symbol, H_WIRE.to_string().repeat(dashes - pre))
        }

        let lanes = self.lanes();
        let wire = H_WIRE.to_string().repeat(STEP_WIDTH);
        let mut grid: Vec<Vec<String>> = vec![vec![wire; self.entries.len()]; lanes.len()];
        let mut links: Vec<Vec<char>> = vec![vec![' '; self.entries.len()]; lanes.len()];

        // --- Populate Grid ---
        // One column per step; a send also marks the target lane and the rows between
        for (t, entry) in self.entries.iter().enumerate() {
            let Some(row) = lanes.iter().position(|lane| *lane == &entry.node) else {
                continue;
            };
            grid[row][t] = format_step(&entry.step.symbol());
            if let TraceStep::Sent { to, .. } = &entry.step {
                if let Some(target) = lanes.iter().position(|lane| *lane == to) {
                    grid[target][t] = format_step("c");
                    let (lo, hi) = (row.min(target), row.max(target));
                    for link_row in links.iter_mut().take(hi).skip(lo) {
                        link_row[t] = V_WIRE;
                    }
                }
            }
        }

        // --- Format Output ---
        let label_width = lanes.iter().map(|l| l.to_string().len()).max().unwrap_or(0) + 2;
        writeln!(f)?;
        for (r, lane) in lanes.iter().enumerate() {
            write!(f, "{:<width$}", format!("{}: ", lane), width = label_width)?;
            writeln!(f, "{}", grid[r].join(""))?;
            if r + 1 < lanes.len() {
                let connectors: String = links[r]
                    .iter()
                    .map(|c| {
                        let pad = STEP_WIDTH / 2;
                        format!("{}{}{}", " ".repeat(pad), c, " ".repeat(STEP_WIDTH - pad - 1))
                    })
                    .collect();
                writeln!(f, "{}{}", " ".repeat(label_width), connectors.trim_end())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trace() -> ProtocolTrace {
        let alice = NodeId::from("sender");
        let bob = NodeId::from("receiver");
        let outcome = MeasurementOutcome::from_bits(false, true);
        let mut trace = ProtocolTrace::new();
        trace.push(SimTime::ZERO, alice.clone(), TraceStep::Started);
        trace.push(SimTime::ZERO, alice.clone(), TraceStep::Measured { outcome });
        trace.push(SimTime::ZERO, alice, TraceStep::Sent { to: bob.clone(), arrives_at: SimTime::new(10) });
        trace.push(SimTime::new(10), bob.clone(), TraceStep::Received { outcome });
        trace.push(
            SimTime::new(10),
            bob,
            TraceStep::Corrected { corrections: CorrectionSet::X, state: QuantumStateTag::One },
        );
        trace
    }

    #[test]
    fn test_find_and_order() {
        let trace = sample_trace();
        assert_eq!(trace.len(), 5);
        let received = trace.find(|s| matches!(s, TraceStep::Received { .. })).unwrap();
        assert_eq!(received.time, SimTime::new(10));
        assert!(trace.entries().windows(2).all(|w| w[0].time <= w[1].time));
    }

    #[test]
    fn test_display_draws_both_lanes() {
        let text = sample_trace().to_string();
        assert!(text.starts_with("ProtocolTrace[5 steps]"));
        assert!(text.contains("Node(sender): "));
        assert!(text.contains("Node(receiver): "));
        assert!(text.contains("───M───"));
        assert!(text.contains("───X───"));
        assert!(text.contains('│'));
    }

    #[test]
    fn test_empty_trace() {
        assert_eq!(ProtocolTrace::new().to_string(), "ProtocolTrace[0 steps]\n");
    }
}
