// src/simulation/config.rs

//! Session configuration.
//!
//! [`SessionConfig`] is the raw surface read from TOML files, CLI flags or
//! exported records. It is only ever turned into a session through
//! [`SessionConfig::validate`], which yields typed [`SessionParams`].

use crate::core::{
    BellStateKind, NodeId, QuantumStateTag, SimTime, TeleportError, TeleportResult, DEFAULT_RUNTIME_PS,
    RECEIVER_NODE, SENDER_NODE,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Unvalidated session parameters.
///
/// ```toml
/// initial_state = "|+⟩"
/// bell_state_type = 3
/// runtime = 1000
/// delay = 100
/// seed = 42
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// State tag to teleport, e.g. `|0⟩`, `|1>`, `+`.
    pub initial_state: String,
    /// 1 for |Φ⁺⟩, 3 for |Ψ⁻⟩.
    pub bell_state_type: i64,
    /// Timeline horizon in picoseconds.
    pub runtime: i64,
    /// Receiver's correction delay in picoseconds.
    pub delay: i64,
    /// Classical channel latency in picoseconds.
    pub channel_delay: i64,
    /// Seed for the measurement sampler; drawn from the OS when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_state: QuantumStateTag::Zero.label().to_string(),
            bell_state_type: i64::from(BellStateKind::PhiPlus.code()),
            runtime: DEFAULT_RUNTIME_PS,
            delay: 0,
            channel_delay: 0,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn new(initial_state: QuantumStateTag, bell: BellStateKind) -> Self {
        Self {
            initial_state: initial_state.label().to_string(),
            bell_state_type: i64::from(bell.code()),
            ..Self::default()
        }
    }

    pub fn with_runtime(mut self, runtime: i64) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_delay(mut self, delay: i64) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_channel_delay(mut self, channel_delay: i64) -> Self {
        self.channel_delay = channel_delay;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> TeleportResult<Self> {
        toml::from_str(content).map_err(|e| TeleportError::config(format!("Failed to parse session config: {}", e)))
    }

    /// Loads a configuration file.
    pub fn from_file(path: &Path) -> TeleportResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TeleportError::config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Checks every field and produces typed parameters.
    pub fn validate(&self) -> TeleportResult<SessionParams> {
        let initial_state: QuantumStateTag = self.initial_state.parse()?;
        let bell_kind = u8::try_from(self.bell_state_type)
            .map_err(|_| TeleportError::config(format!("Unsupported bell_state_type {}", self.bell_state_type)))
            .and_then(BellStateKind::try_from)?;
        let runtime = non_negative("runtime", self.runtime)?;
        let delay = non_negative("delay", self.delay)?;
        let channel_delay = non_negative("channel_delay", self.channel_delay)?;

        Ok(SessionParams {
            initial_state,
            bell_kind,
            runtime,
            delay,
            channel_delay,
            seed: self.seed,
            sender: NodeId::from(SENDER_NODE),
            receiver: NodeId::from(RECEIVER_NODE),
        })
    }
}

fn non_negative(field: &str, value: i64) -> TeleportResult<SimTime> {
    SimTime::from_signed(value).ok_or_else(|| TeleportError::config(format!("{} must be non-negative, got {}", field, value)))
}

/// Validated parameters of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    pub initial_state: QuantumStateTag,
    pub bell_kind: BellStateKind,
    pub runtime: SimTime,
    pub delay: SimTime,
    pub channel_delay: SimTime,
    pub seed: Option<u64>,
    pub sender: NodeId,
    pub receiver: NodeId,
}

impl SessionParams {
    /// Converts back to the raw surface, e.g. for an exported record.
    pub fn to_config(&self) -> SessionConfig {
        SessionConfig {
            initial_state: self.initial_state.label().to_string(),
            bell_state_type: i64::from(self.bell_kind.code()),
            runtime: saturating_i64(self.runtime),
            delay: saturating_i64(self.delay),
            channel_delay: saturating_i64(self.channel_delay),
            seed: self.seed,
        }
    }
}

pub(crate) fn saturating_i64(time: SimTime) -> i64 {
    i64::try_from(time.picoseconds()).unwrap_or(i64::MAX)
}

impl fmt::Display for SessionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} via {}, runtime {}, delay {}, channel delay {}",
            self.initial_state, self.bell_kind, self.runtime, self.delay, self.channel_delay
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() -> TeleportResult<()> {
        let params = SessionConfig::default().validate()?;
        assert_eq!(params.initial_state, QuantumStateTag::Zero);
        assert_eq!(params.bell_kind, BellStateKind::PhiPlus);
        assert_eq!(params.runtime, SimTime::new(1_000));
        assert!(params.delay.is_zero());
        assert!(params.channel_delay.is_zero());
        Ok(())
    }

    #[test]
    fn test_rejects_unknown_bell_type() {
        for bad in [0, 2, 4, -1, 300] {
            let config = SessionConfig { bell_state_type: bad, ..SessionConfig::default() };
            assert!(
                matches!(config.validate(), Err(TeleportError::Configuration { .. })),
                "bell_state_type {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_rejects_negative_timing() {
        let cases = [
            SessionConfig::default().with_runtime(-1),
            SessionConfig::default().with_delay(-5),
            SessionConfig::default().with_channel_delay(-10),
        ];
        for config in cases {
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("non-negative"), "{}", err);
        }
    }

    #[test]
    fn test_rejects_malformed_state() {
        let config = SessionConfig { initial_state: "|2⟩".into(), ..SessionConfig::default() };
        assert!(matches!(config.validate(), Err(TeleportError::Configuration { .. })));
    }

    #[test]
    fn test_toml_round_trip() -> TeleportResult<()> {
        let config = SessionConfig::from_toml_str(
            r#"
            initial_state = "|+>"
            bell_state_type = 3
            delay = 100
            seed = 7
            "#,
        )?;
        assert_eq!(config.runtime, DEFAULT_RUNTIME_PS);
        let params = config.validate()?;
        assert_eq!(params.initial_state, QuantumStateTag::Plus);
        assert_eq!(params.bell_kind, BellStateKind::PsiMinus);
        assert_eq!(params.delay, SimTime::new(100));
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.to_config().initial_state, "|+⟩");
        Ok(())
    }

    #[test]
    fn test_malformed_toml_is_a_configuration_error() {
        assert!(matches!(
            SessionConfig::from_toml_str("bell_state_type = \"one\""),
            Err(TeleportError::Configuration { .. })
        ));
    }
}
