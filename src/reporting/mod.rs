// src/reporting/mod.rs

//! Summaries over many sessions, and the JSON export format.
//!
//! Nothing here feeds back into the protocol; it only reads [`SessionRecord`]s.
//!
//! [`SessionRecord`]: crate::simulation::SessionRecord

pub mod export;
pub mod statistics;

pub use export::{export_json, load_export, parse_export, write_export, ExportDocument, ExportedResult, ResultMetrics};
pub use statistics::{
    chi_square_uniform, CorrectionPatterns, MeasurementDistribution, StatisticsSummary, TheoryComparison,
    TimingStatistics,
};
