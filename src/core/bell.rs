// src/core/bell.rs

use super::error::TeleportError;
use num_complex::Complex;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;

/// Which Bell state the sender and receiver pre-share.
///
/// Fixed at session setup and never mutated. On the configuration and export
/// surfaces it is carried as an integer code
/// (1 for |Φ⁺⟩, 3 for |Ψ⁻⟩).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BellStateKind {
    /// |Φ⁺⟩ = (|00⟩ + |11⟩)/√2
    PhiPlus,
    /// |Ψ⁻⟩ = (|01⟩ − |10⟩)/√2
    PsiMinus,
}

impl BellStateKind {
    pub const ALL: [BellStateKind; 2] = [Self::PhiPlus, Self::PsiMinus];

    /// Integer code on the configuration surface.
    pub fn code(self) -> u8 {
        match self {
            Self::PhiPlus => 1,
            Self::PsiMinus => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PhiPlus => "|Φ⁺⟩",
            Self::PsiMinus => "|Ψ⁻⟩",
        }
    }

    /// Two-qubit amplitudes over the basis |00⟩, |01⟩, |10⟩, |11⟩.
    pub fn amplitudes(self) -> [Complex<f64>; 4] {
        let h = Complex::new(FRAC_1_SQRT_2, 0.0);
        let z = Complex::zero();
        match self {
            Self::PhiPlus => [h, z, z, h],
            Self::PsiMinus => [z, h, -h, z],
        }
    }
}

impl TryFrom<u8> for BellStateKind {
    type Error = TeleportError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::PhiPlus),
            3 => Ok(Self::PsiMinus),
            other => Err(TeleportError::config(format!(
                "Unsupported bell_state_type {} (expected 1 for |Φ⁺⟩ or 3 for |Ψ⁻⟩)",
                other
            ))),
        }
    }
}

impl From<BellStateKind> for u8 {
    fn from(kind: BellStateKind) -> u8 {
        kind.code()
    }
}

impl fmt::Display for BellStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (type {})", self.label(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_roundtrip() {
        for kind in BellStateKind::ALL {
            assert_eq!(BellStateKind::try_from(kind.code()).unwrap(), kind);
        }
    }

    #[test]
    fn test_invalid_code_is_configuration_error() {
        for code in [0u8, 2, 4, 255] {
            let err = BellStateKind::try_from(code).unwrap_err();
            assert!(matches!(err, TeleportError::Configuration { .. }), "code {}", code);
        }
    }

    #[test]
    fn test_serde_as_integer_code() {
        assert_eq!(serde_json::to_string(&BellStateKind::PsiMinus).unwrap(), "3");
        let kind: BellStateKind = serde_json::from_str("1").unwrap();
        assert_eq!(kind, BellStateKind::PhiPlus);
        assert!(serde_json::from_str::<BellStateKind>("2").is_err());
    }

    #[test]
    fn test_pair_amplitudes_normalized() {
        for kind in BellStateKind::ALL {
            let norm: f64 = kind.amplitudes().iter().map(|c| c.norm_sqr()).sum();
            assert!((norm - 1.0).abs() < 1e-12);
        }
    }
}
