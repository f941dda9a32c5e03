// src/reporting/export.rs

//! JSON export of a result set, and parsing it back.

use super::statistics::{CorrectionPatterns, MeasurementDistribution};
use crate::core::{
    BellStateKind, MeasurementOutcome, QuantumStateTag, SimTime, TeleportError, TeleportResult, EXPORT_VERSION,
};
use crate::operations::Correction;
use crate::simulation::SessionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportInfo {
    pub timestamp: DateTime<Utc>,
    pub total_results: usize,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub measurement_distribution: MeasurementDistribution,
    pub correction_patterns: CorrectionPatterns,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedConfiguration {
    pub initial_state: QuantumStateTag,
    pub bell_state_type: BellStateKind,
    pub runtime: SimTime,
    pub delay: SimTime,
    #[serde(default)]
    pub channel_delay: SimTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedOutcome {
    pub measurement_results: Option<MeasurementOutcome>,
    pub final_state: Option<QuantumStateTag>,
    #[serde(default)]
    pub corrections_applied: Vec<Correction>,
}

/// Values derived from a record at export time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetrics {
    /// runtime + delay, in picoseconds.
    pub total_time: SimTime,
    pub corrections: Vec<Correction>,
    pub correction_count: usize,
    pub success: bool,
    pub fidelity: f64,
}

impl ResultMetrics {
    pub fn of(record: &SessionRecord) -> Self {
        Self {
            total_time: record.total_time(),
            corrections: record.corrections_applied.clone(),
            correction_count: record.corrections_applied.len(),
            success: record.is_success(),
            fidelity: record.fidelity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedResult {
    /// 1-based position in the export.
    pub run_id: usize,
    pub timestamp: DateTime<Utc>,
    pub configuration: ExportedConfiguration,
    pub results: ExportedOutcome,
    pub metrics: ResultMetrics,
}

impl ExportedResult {
    fn from_record(run_id: usize, record: &SessionRecord) -> Self {
        Self {
            run_id,
            timestamp: record.timestamp,
            configuration: ExportedConfiguration {
                initial_state: record.initial_state,
                bell_state_type: record.bell_state_type,
                runtime: record.runtime,
                delay: record.delay,
                channel_delay: record.channel_delay,
                seed: record.seed,
            },
            results: ExportedOutcome {
                measurement_results: record.measurement_results,
                final_state: record.final_state,
                corrections_applied: record.corrections_applied.clone(),
            },
            metrics: ResultMetrics::of(record),
        }
    }

    /// Rebuilds the session record. Event timestamps are not exported and come back empty.
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            initial_state: self.configuration.initial_state,
            bell_state_type: self.configuration.bell_state_type,
            measurement_results: self.results.measurement_results,
            final_state: self.results.final_state,
            corrections_applied: self.results.corrections_applied.clone(),
            runtime: self.configuration.runtime,
            delay: self.configuration.delay,
            channel_delay: self.configuration.channel_delay,
            timestamp: self.timestamp,
            seed: self.configuration.seed,
            received_at: None,
            corrected_at: None,
        }
    }
}

/// The whole export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub export_info: ExportInfo,
    pub summary: ExportSummary,
    pub results: Vec<ExportedResult>,
}

impl ExportDocument {
    /// Builds the document; an empty result set is an error.
    pub fn from_records(records: &[SessionRecord]) -> TeleportResult<Self> {
        if records.is_empty() {
            return Err(TeleportError::Export { message: "No results to export".to_string() });
        }
        Ok(Self {
            export_info: ExportInfo {
                timestamp: Utc::now(),
                total_results: records.len(),
                version: EXPORT_VERSION.to_string(),
            },
            summary: ExportSummary {
                measurement_distribution: MeasurementDistribution::from_records(records),
                correction_patterns: CorrectionPatterns::from_records(records),
            },
            results: records
                .iter()
                .enumerate()
                .map(|(i, record)| ExportedResult::from_record(i + 1, record))
                .collect(),
        })
    }

    pub fn to_json(&self) -> TeleportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> TeleportResult<Self> {
        let document: Self = serde_json::from_str(json)?;
        if document.export_info.total_results != document.results.len() {
            return Err(TeleportError::Export {
                message: format!(
                    "export_info.total_results is {} but {} results are present",
                    document.export_info.total_results,
                    document.results.len()
                ),
            });
        }
        Ok(document)
    }

    /// Records in export order.
    pub fn records(&self) -> Vec<SessionRecord> {
        self.results.iter().map(ExportedResult::to_record).collect()
    }
}

/// Serializes `records` into the export format.
pub fn export_json(records: &[SessionRecord]) -> TeleportResult<String> {
    ExportDocument::from_records(records)?.to_json()
}

pub fn parse_export(json: &str) -> TeleportResult<ExportDocument> {
    ExportDocument::from_json(json)
}

/// Writes the export document for `records` to `path`.
pub fn write_export(path: &Path, records: &[SessionRecord]) -> TeleportResult<()> {
    let json = export_json(records)?;
    std::fs::write(path, json)
        .map_err(|e| TeleportError::Export { message: format!("Failed to write {}: {}", path.display(), e) })?;
    info!(path = %path.display(), results = records.len(), "results exported");
    Ok(())
}

/// Loads the records of an export file.
pub fn load_export(path: &Path) -> TeleportResult<Vec<SessionRecord>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| TeleportError::Export { message: format!("Failed to read {}: {}", path.display(), e) })?;
    Ok(parse_export(&json)?.records())
}
