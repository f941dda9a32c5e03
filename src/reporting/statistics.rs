// src/reporting/statistics.rs

//! Aggregates over many session records.
//!
//! Outcome-keyed maps use the outcome's display form, `"(0, 1)"`, so they
//! serialize straight into JSON objects.

use crate::core::{
    BellStateKind, MeasurementOutcome, QuantumStateTag, CHI_SQUARE_CRITICAL_95_DF3, OUTCOME_PROBABILITY,
};
use crate::operations::{resolve, CorrectionSet};
use crate::simulation::SessionRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { count as f64 / total as f64 * 100.0 }
}

/// How often each Bell-measurement outcome occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementDistribution {
    pub counts: BTreeMap<String, usize>,
    pub percentages: BTreeMap<String, f64>,
    pub total_measurements: usize,
    pub expected_percentage: f64,
    /// Absolute distance from the expected percentage, per outcome.
    pub deviations: BTreeMap<String, f64>,
    pub max_deviation: f64,
}

impl MeasurementDistribution {
    /// Counts the outcomes of `records`; records without a measurement are skipped.
    pub fn from_records(records: &[SessionRecord]) -> Self {
        Self::from_outcomes(records.iter().filter_map(|r| r.measurement_results))
    }

    pub fn from_outcomes(outcomes: impl IntoIterator<Item = MeasurementOutcome>) -> Self {
        let mut tally = [0usize; 4];
        for outcome in outcomes {
            tally[outcome.index()] += 1;
        }
        Self::from_tally(tally)
    }

    fn from_tally(tally: [usize; 4]) -> Self {
        let total: usize = tally.iter().sum();
        let expected_percentage = OUTCOME_PROBABILITY * 100.0;
        let mut counts = BTreeMap::new();
        let mut percentages = BTreeMap::new();
        let mut deviations = BTreeMap::new();
        for outcome in MeasurementOutcome::ALL {
            let key = outcome.to_string();
            let count = tally[outcome.index()];
            let pct = percentage(count, total);
            counts.insert(key.clone(), count);
            percentages.insert(key.clone(), pct);
            deviations.insert(key, (pct - expected_percentage).abs());
        }
        let max_deviation = deviations.values().copied().fold(0.0, f64::max);
        Self { counts, percentages, total_measurements: total, expected_percentage, deviations, max_deviation }
    }

    pub fn count(&self, outcome: MeasurementOutcome) -> usize {
        self.counts.get(&outcome.to_string()).copied().unwrap_or(0)
    }

    pub fn percentage(&self, outcome: MeasurementOutcome) -> f64 {
        self.percentages.get(&outcome.to_string()).copied().unwrap_or(0.0)
    }

    /// Counts in `MeasurementOutcome::ALL` order.
    pub fn tally(&self) -> [usize; 4] {
        MeasurementOutcome::ALL.map(|o| self.count(o))
    }

    /// Chi-square goodness of fit against the uniform distribution.
    pub fn theory_comparison(&self) -> TheoryComparison {
        TheoryComparison::uniform(self.tally())
    }
}

impl fmt::Display for MeasurementDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Measurement results distribution over {} runs:", self.total_measurements)?;
        for outcome in MeasurementOutcome::ALL {
            writeln!(
                f,
                "  {}: {} times ({:.1}%)",
                outcome,
                self.count(outcome),
                self.percentage(outcome)
            )?;
        }
        write!(f, "  Max deviation from {:.0}%: {:.2}%", self.expected_percentage, self.max_deviation)
    }
}

/// Chi-square comparison of observed outcome counts with the ideal 25% each.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TheoryComparison {
    pub chi_square: f64,
    pub degrees_of_freedom: u32,
    pub critical_value: f64,
    /// `chi_square` is below the 95% critical value.
    pub consistent: bool,
    pub total: usize,
}

impl TheoryComparison {
    pub fn uniform(tally: [usize; 4]) -> Self {
        let chi_square = chi_square_uniform(&tally);
        Self {
            chi_square,
            degrees_of_freedom: 3,
            critical_value: CHI_SQUARE_CRITICAL_95_DF3,
            consistent: chi_square < CHI_SQUARE_CRITICAL_95_DF3,
            total: tally.iter().sum(),
        }
    }
}

impl fmt::Display for TheoryComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "χ² = {:.3} (df = {}, critical value {:.3} at 95%): {}",
            self.chi_square,
            self.degrees_of_freedom,
            self.critical_value,
            if self.consistent { "consistent with uniform" } else { "deviates from uniform" }
        )
    }
}

/// Σ (observed − expected)² / expected, expected = total / 4. Zero for an empty tally.
pub fn chi_square_uniform(tally: &[usize; 4]) -> f64 {
    let total: usize = tally.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let expected = total as f64 * OUTCOME_PROBABILITY;
    tally.iter().map(|&observed| (observed as f64 - expected).powi(2) / expected).sum()
}

/// How often each correction pattern was required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionPatterns {
    pub counts: BTreeMap<String, usize>,
    pub percentages: BTreeMap<String, f64>,
    /// Pattern counts keyed by Bell-state code, `"1"` and `"3"`.
    pub by_bell_state: BTreeMap<String, BTreeMap<String, usize>>,
    pub total_results: usize,
}

impl CorrectionPatterns {
    /// Patterns are resolved from each record's Bell state and outcome.
    pub fn from_records(records: &[SessionRecord]) -> Self {
        let empty = || CorrectionSet::ALL.iter().map(|c| (c.label().to_string(), 0usize)).collect::<BTreeMap<_, _>>();
        let mut counts = empty();
        let mut by_bell_state: BTreeMap<String, BTreeMap<String, usize>> =
            BellStateKind::ALL.iter().map(|k| (k.code().to_string(), empty())).collect();
        let mut total = 0;

        for record in records {
            let Some(outcome) = record.measurement_results else {
                continue;
            };
            let label = resolve(record.bell_state_type, outcome).label().to_string();
            *counts.entry(label.clone()).or_default() += 1;
            *by_bell_state
                .entry(record.bell_state_type.code().to_string())
                .or_default()
                .entry(label)
                .or_default() += 1;
            total += 1;
        }

        let percentages = counts.iter().map(|(k, &v)| (k.clone(), percentage(v, total))).collect();
        Self { counts, percentages, by_bell_state, total_results: total }
    }

    pub fn count(&self, set: CorrectionSet) -> usize {
        self.counts.get(set.label()).copied().unwrap_or(0)
    }

    pub fn count_for(&self, bell: BellStateKind, set: CorrectionSet) -> usize {
        self.by_bell_state
            .get(&bell.code().to_string())
            .and_then(|m| m.get(set.label()))
            .copied()
            .unwrap_or(0)
    }
}

impl fmt::Display for CorrectionPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Correction patterns over {} results:", self.total_results)?;
        for set in CorrectionSet::ALL {
            write!(f, "  {:<4} {:>6}", set.label(), self.count(set))?;
            for bell in BellStateKind::ALL {
                write!(f, "   {}: {}", bell.label(), self.count_for(bell, set))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Mean, population standard deviation and range of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingStatistics {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl TimingStatistics {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self { mean, std: variance.sqrt(), min, max })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingSummary {
    pub runtime: TimingStatistics,
    pub delay: TimingStatistics,
}

/// Everything the dashboard summarises about a set of runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub total_runs: usize,
    pub state_distribution: BTreeMap<String, usize>,
    pub bell_state_distribution: BTreeMap<String, usize>,
    pub timing_statistics: TimingSummary,
    pub measurement_analysis: MeasurementDistribution,
    pub correction_analysis: CorrectionPatterns,
    pub theory_comparison: TheoryComparison,
    /// Runs that recovered the initial state.
    pub successful_runs: usize,
    pub mean_fidelity: f64,
}

impl StatisticsSummary {
    /// `None` for an empty set of records.
    pub fn from_records(records: &[SessionRecord]) -> Option<Self> {
        // --- Timing ---
        let runtimes: Vec<f64> = records.iter().map(|r| r.runtime.picoseconds() as f64).collect();
        let delays: Vec<f64> = records.iter().map(|r| r.delay.picoseconds() as f64).collect();
        let timing_statistics = TimingSummary {
            runtime: TimingStatistics::from_values(&runtimes)?,
            delay: TimingStatistics::from_values(&delays)?,
        };

        // --- Configuration Mix ---
        let mut state_distribution = BTreeMap::new();
        let mut bell_state_distribution = BTreeMap::new();
        for record in records {
            *state_distribution.entry(record.initial_state.label().to_string()).or_insert(0) += 1;
            *bell_state_distribution.entry(record.bell_state_type.label().to_string()).or_insert(0) += 1;
        }

        // --- Outcomes and Corrections ---
        let measurement_analysis = MeasurementDistribution::from_records(records);
        let theory_comparison = measurement_analysis.theory_comparison();
        Some(Self {
            total_runs: records.len(),
            state_distribution,
            bell_state_distribution,
            timing_statistics,
            correction_analysis: CorrectionPatterns::from_records(records),
            measurement_analysis,
            theory_comparison,
            successful_runs: records.iter().filter(|r| r.is_success()).count(),
            mean_fidelity: records.iter().map(SessionRecord::fidelity).sum::<f64>() / records.len() as f64,
        })
    }

    pub fn state_count(&self, state: QuantumStateTag) -> usize {
        self.state_distribution.get(state.label()).copied().unwrap_or(0)
    }
}

impl fmt::Display for StatisticsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistics over {} runs", self.total_runs)?;
        writeln!(f, "  Successful: {}/{} (mean fidelity {:.4})", self.successful_runs, self.total_runs, self.mean_fidelity)?;
        let runtime = &self.timing_statistics.runtime;
        let delay = &self.timing_statistics.delay;
        writeln!(
            f,
            "  Runtime ps: mean {:.1}, std {:.1}, min {:.0}, max {:.0}",
            runtime.mean, runtime.std, runtime.min, runtime.max
        )?;
        writeln!(
            f,
            "  Delay ps:   mean {:.1}, std {:.1}, min {:.0}, max {:.0}",
            delay.mean, delay.std, delay.min, delay.max
        )?;
        writeln!(f, "{}", self.measurement_analysis)?;
        writeln!(f, "  {}", self.theory_comparison)?;
        write!(f, "{}", self.correction_analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SimTime;
    use chrono::Utc;

    fn record(bell: BellStateKind, b1: bool, b2: bool, delay: u64) -> SessionRecord {
        let outcome = MeasurementOutcome::from_bits(b1, b2);
        let set = resolve(bell, outcome);
        SessionRecord {
            initial_state: QuantumStateTag::Plus,
            bell_state_type: bell,
            measurement_results: Some(outcome),
            final_state: Some(QuantumStateTag::Plus),
            corrections_applied: set.gates().to_vec(),
            runtime: SimTime::new(1_000),
            delay: SimTime::new(delay),
            channel_delay: SimTime::ZERO,
            timestamp: Utc::now(),
            seed: None,
            received_at: Some(SimTime::ZERO),
            corrected_at: Some(SimTime::new(delay)),
        }
    }

    #[test]
    fn test_distribution_counts_and_keys() {
        let records = vec![
            record(BellStateKind::PhiPlus, false, false, 0),
            record(BellStateKind::PhiPlus, false, false, 0),
            record(BellStateKind::PhiPlus, true, true, 0),
            record(BellStateKind::PsiMinus, false, true, 0),
        ];
        let dist = MeasurementDistribution::from_records(&records);
        assert_eq!(dist.total_measurements, 4);
        assert_eq!(dist.counts["(0, 0)"], 2);
        assert_eq!(dist.counts["(1, 0)"], 0);
        assert!((dist.percentage(MeasurementOutcome::from_bits(false, false)) - 50.0).abs() < 1e-9);
        assert!((dist.max_deviation - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_chi_square() {
        assert_eq!(chi_square_uniform(&[25, 25, 25, 25]), 0.0);
        // expected 25: (10² + 10² + 0 + 0) / 25
        assert!((chi_square_uniform(&[35, 15, 25, 25]) - 8.0).abs() < 1e-12);
        assert!(!TheoryComparison::uniform([35, 15, 25, 25]).consistent);
        assert!(TheoryComparison::uniform([26, 24, 25, 25]).consistent);
        assert_eq!(chi_square_uniform(&[0, 0, 0, 0]), 0.0);
    }

    #[test]
    fn test_correction_patterns_by_bell_state() {
        let records = vec![
            record(BellStateKind::PhiPlus, false, false, 0),
            record(BellStateKind::PhiPlus, true, true, 0),
            record(BellStateKind::PsiMinus, false, false, 0),
            record(BellStateKind::PsiMinus, false, true, 0),
        ];
        let patterns = CorrectionPatterns::from_records(&records);
        assert_eq!(patterns.total_results, 4);
        assert_eq!(patterns.count(CorrectionSet::Identity), 2);
        assert_eq!(patterns.count(CorrectionSet::X), 1);
        assert_eq!(patterns.count(CorrectionSet::XThenZ), 1);
        assert_eq!(patterns.count_for(BellStateKind::PsiMinus, CorrectionSet::X), 1);
        assert_eq!(patterns.by_bell_state["1"]["X+Z"], 1);
    }

    #[test]
    fn test_summary_timing() {
        let records = vec![
            record(BellStateKind::PhiPlus, false, false, 0),
            record(BellStateKind::PhiPlus, false, true, 200),
        ];
        let summary = StatisticsSummary::from_records(&records).unwrap();
        assert_eq!(summary.total_runs, 2);
        assert_eq!(summary.successful_runs, 2);
        assert!((summary.timing_statistics.delay.mean - 100.0).abs() < 1e-9);
        assert!((summary.timing_statistics.delay.std - 100.0).abs() < 1e-9);
        assert_eq!(summary.timing_statistics.runtime.std, 0.0);
        assert_eq!(summary.state_count(QuantumStateTag::Plus), 2);
        assert_eq!(summary.bell_state_distribution["|Φ⁺⟩"], 2);
        assert!(StatisticsSummary::from_records(&[]).is_none());
    }
}
