// src/core/outcome.rs

use super::error::TeleportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two classical bits `(b1, b2)` produced by the sender's Bell measurement.
///
/// Produced once per teleportation attempt and immutable afterwards. On the
/// wire it is the JSON array `[b1, b2]`; as a map key it is the string `"(b1, b2)"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "[u8; 2]", into = "[u8; 2]")]
pub struct MeasurementOutcome {
    b1: bool,
    b2: bool,
}

impl MeasurementOutcome {
    /// All four outcomes in index order (00, 01, 10, 11).
    pub const ALL: [MeasurementOutcome; 4] = [
        MeasurementOutcome::from_bits(false, false),
        MeasurementOutcome::from_bits(false, true),
        MeasurementOutcome::from_bits(true, false),
        MeasurementOutcome::from_bits(true, true),
    ];

    pub const fn from_bits(b1: bool, b2: bool) -> Self {
        Self { b1, b2 }
    }

    /// Builds an outcome from integer bits, rejecting anything but 0 and 1.
    pub fn new(b1: u8, b2: u8) -> Result<Self, TeleportError> {
        match (b1, b2) {
            (0 | 1, 0 | 1) => Ok(Self::from_bits(b1 == 1, b2 == 1)),
            _ => Err(TeleportError::config(format!(
                "Measurement bits must be 0 or 1, got ({}, {})",
                b1, b2
            ))),
        }
    }

    /// Outcome for index `b1*2 + b2`; only the two low bits are used.
    pub const fn from_index(index: u8) -> Self {
        Self::from_bits(index & 0b10 != 0, index & 0b01 != 0)
    }

    pub const fn index(self) -> usize {
        ((self.b1 as usize) << 1) | self.b2 as usize
    }

    pub const fn bit1(self) -> u8 {
        self.b1 as u8
    }

    pub const fn bit2(self) -> u8 {
        self.b2 as u8
    }

    pub const fn bits(self) -> [u8; 2] {
        [self.bit1(), self.bit2()]
    }
}

impl TryFrom<[u8; 2]> for MeasurementOutcome {
    type Error = TeleportError;

    fn try_from(bits: [u8; 2]) -> Result<Self, Self::Error> {
        Self::new(bits[0], bits[1])
    }
}

impl From<MeasurementOutcome> for [u8; 2] {
    fn from(outcome: MeasurementOutcome) -> [u8; 2] {
        outcome.bits()
    }
}

impl fmt::Display for MeasurementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.bit1(), self.bit2())
    }
}

impl FromStr for MeasurementOutcome {
    type Err = TeleportError;

    /// Parses `"(0, 1)"`, `"[0, 1]"`, `"0,1"` or `"01"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: Vec<u8> = s
            .chars()
            .filter(|c| !matches!(c, '(' | ')' | '[' | ']' | ',' | ' '))
            .map(|c| match c {
                '0' => Ok(0),
                '1' => Ok(1),
                other => Err(TeleportError::config(format!("Invalid measurement bit '{}' in '{}'", other, s))),
            })
            .collect::<Result<_, _>>()?;
        match digits.as_slice() {
            [b1, b2] => Self::new(*b1, *b2),
            _ => Err(TeleportError::config(format!("Measurement outcome '{}' must have exactly two bits", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_order() {
        for (i, outcome) in MeasurementOutcome::ALL.iter().enumerate() {
            assert_eq!(outcome.index(), i);
            assert_eq!(MeasurementOutcome::from_index(i as u8), *outcome);
        }
        assert_eq!(MeasurementOutcome::from_index(2).bits(), [1, 0]);
    }

    #[test]
    fn test_rejects_non_binary_bits() {
        assert!(MeasurementOutcome::new(2, 0).is_err());
        assert!(serde_json::from_str::<MeasurementOutcome>("[0, 3]").is_err());
    }

    #[test]
    fn test_display_and_parse_key_form() -> Result<(), TeleportError> {
        let outcome = MeasurementOutcome::new(1, 0)?;
        assert_eq!(outcome.to_string(), "(1, 0)");
        assert_eq!("(1, 0)".parse::<MeasurementOutcome>()?, outcome);
        assert_eq!("[1, 0]".parse::<MeasurementOutcome>()?, outcome);
        assert_eq!("10".parse::<MeasurementOutcome>()?, outcome);
        assert!("(1, 0, 1)".parse::<MeasurementOutcome>().is_err());
        Ok(())
    }

    #[test]
    fn test_serializes_as_bit_array() {
        let json = serde_json::to_string(&MeasurementOutcome::from_bits(false, true)).unwrap();
        assert_eq!(json, "[0,1]");
    }
}
