//! Protocol and reporting constants.

/// Defaults and fixed values shared by the session, reporting and export layers.
pub mod protocol_constants {
    /// Default timeline horizon in picoseconds.
    pub const DEFAULT_RUNTIME_PS: i64 = 1_000;
    /// Default node names.
    pub const SENDER_NODE: &str = "sender";
    pub const RECEIVER_NODE: &str = "receiver";
    /// Memory names on each node.
    pub const SENDER_UNKNOWN_MEMORY: &str = "sender_unknown";
    pub const SENDER_EPR_MEMORY: &str = "sender_epr";
    pub const RECEIVER_EPR_MEMORY: &str = "receiver_epr";
    /// Ideal probability of each Bell-measurement outcome.
    pub const OUTCOME_PROBABILITY: f64 = 0.25;
    /// χ² critical value at 95% confidence for 3 degrees of freedom.
    pub const CHI_SQUARE_CRITICAL_95_DF3: f64 = 7.815;
    /// Version stamped into export documents.
    pub const EXPORT_VERSION: &str = "1.0.0";
}
