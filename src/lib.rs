// src/lib.rs

//! `qteleport` - A discrete-event simulation of quantum teleportation
//!
//! This library models the classical control flow of the teleportation
//! protocol: a sender measures its half of a pre-shared Bell pair together
//! with an unknown state, sends two classical bits over a channel, and a
//! receiver applies the Pauli corrections those bits select.

pub mod core;
pub mod operations;
pub mod protocol;
pub mod reporting;
pub mod simulation;
pub mod trace;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use core::{BellStateKind, MeasurementOutcome, NodeId, QuantumStateTag, SimTime, TeleportError, TeleportResult};
pub use operations::{resolve, Correction, CorrectionSet};
pub use protocol::{FixedOutcome, OutcomeSampler, OutcomeSource, Receiver, ReceiverPhase, Sender, SenderPhase};
pub use reporting::{export_json, parse_export, ExportDocument, MeasurementDistribution, StatisticsSummary};
pub use simulation::{ProtocolSession, SessionConfig, SessionPhase, SessionRecord, Simulator};
pub use trace::ProtocolTrace;
pub use validation::{validate_record, validate_record_value, ValidationReport};

// Example 1: Forced outcome through |Φ⁺⟩
// With both bits set the receiver needs X and then Z, and recovers the
// state the sender started with.
/// ```
/// use qteleport::{
///     BellStateKind, Correction, FixedOutcome, MeasurementOutcome, QuantumStateTag, SessionConfig, Simulator,
///     TeleportError,
/// };
///
/// let config = SessionConfig::new(QuantumStateTag::Plus, BellStateKind::PhiPlus);
/// let forced = FixedOutcome(MeasurementOutcome::from_bits(true, true));
///
/// let record = Simulator::new().run_with_source(&config, Box::new(forced))?;
/// println!("{}", record);
///
/// assert_eq!(record.corrections_applied, vec![Correction::X, Correction::Z]);
/// assert_eq!(record.final_state, Some(QuantumStateTag::Plus));
/// # Ok::<(), TeleportError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Repeated runs and export
// Seeded repetitions are reproducible; the export can be parsed back.
/// ```
/// use qteleport::{export_json, parse_export, MeasurementDistribution, SessionConfig, Simulator, TeleportError};
///
/// let config = SessionConfig::default().with_delay(100);
/// let records = Simulator::new().repeat(&config, 200, 42)?;
/// assert!(records.iter().all(|r| r.is_success()));
///
/// let distribution = MeasurementDistribution::from_records(&records);
/// assert_eq!(distribution.total_measurements, 200);
///
/// let parsed = parse_export(&export_json(&records)?)?;
/// assert_eq!(parsed.records().len(), 200);
/// # Ok::<(), TeleportError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
