// src/validation/mod.rs

//! Structural checks on result records.
//!
//! Problems that make a record unusable are errors; anything merely unusual
//! is a warning. Both are collected rather than stopping at the first.

use crate::core::{BellStateKind, MeasurementOutcome, QuantumStateTag};
use crate::operations::{resolve, CorrectionSet};
use crate::simulation::SessionRecord;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

const DEFAULT_FIDELITY_TOLERANCE: f64 = 1e-9;

const REQUIRED_FIELDS: [&str; 3] = ["initial_state", "bell_state_type", "measurement_results"];

/// Findings for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// No errors; warnings are allowed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.is_valid() { "valid" } else { "invalid" })?;
        for e in &self.errors {
            write!(f, "\n  error: {}", e)?;
        }
        for w in &self.warnings {
            write!(f, "\n  warning: {}", w)?;
        }
        Ok(())
    }
}

/// Validates a record in its JSON form, as read from a file or another tool.
pub fn validate_record_value(record: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    for field in REQUIRED_FIELDS {
        if record.get(field).is_none() {
            report.error(format!("Missing required field: {}", field));
        }
    }

    match record.get("measurement_results").and_then(Value::as_array) {
        Some(bits) if bits.len() == 2 => {
            if !bits.iter().all(|b| matches!(b.as_u64(), Some(0 | 1))) {
                report.error("measurement_results must contain only 0 or 1");
            }
        }
        _ => report.error("measurement_results must be a list of 2 elements"),
    }

    let bell_ok = record
        .get("bell_state_type")
        .and_then(Value::as_u64)
        .and_then(|code| u8::try_from(code).ok())
        .is_some_and(|code| BellStateKind::try_from(code).is_ok());
    if !bell_ok {
        report.error("bell_state_type must be 1 or 3");
    }

    let state = record.get("initial_state").and_then(Value::as_str);
    let known = QuantumStateTag::ALL.iter().any(|tag| Some(tag.label()) == state);
    if !known {
        report.warn(format!("Unusual initial state: {}", state.unwrap_or("<missing>")));
    }

    let negative = ["runtime", "delay", "channel_delay"]
        .iter()
        .filter_map(|field| record.get(*field))
        .any(|v| v.as_i64().is_some_and(|n| n < 0) || v.as_f64().is_some_and(|n| n < 0.0));
    if negative {
        report.error("Runtime and delay must be non-negative");
    }

    report
}

/// Validates a typed record.
///
/// Types already rule out most structural problems; this checks the record
/// is internally consistent with the correction rule.
pub fn validate_record(record: &SessionRecord) -> ValidationReport {
    let mut report = match serde_json::to_value(record) {
        Ok(value) => validate_record_value(&value),
        Err(err) => {
            let mut report = ValidationReport::default();
            report.error(format!("record cannot be serialized: {}", err));
            return report;
        }
    };

    match (record.measurement_results, record.final_state) {
        (Some(outcome), Some(_)) => check_corrections(record.bell_state_type, outcome, record, &mut report),
        (None, Some(_)) => report.error("final_state present without measurement_results"),
        (_, None) => {
            if !record.corrections_applied.is_empty() {
                report.error("corrections_applied present on a session that never corrected");
            }
            report.warn("session did not complete before the runtime horizon");
        }
    }
    report
}

fn check_corrections(
    bell: BellStateKind,
    outcome: MeasurementOutcome,
    record: &SessionRecord,
    report: &mut ValidationReport,
) {
    let expected = resolve(bell, outcome);
    match CorrectionSet::from_gates(&record.corrections_applied) {
        Some(applied) if applied == expected => {}
        _ => report.error(format!(
            "corrections_applied does not match {} for {} with outcome {}",
            expected, bell, outcome
        )),
    }
    if (record.fidelity() - 1.0).abs() > DEFAULT_FIDELITY_TOLERANCE {
        report.warn(format!("final state fidelity {:.6} is below 1", record.fidelity()));
    }
}
