// src/core/state.rs

use super::error::TeleportError;
use num_complex::Complex;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;
use std::str::FromStr;

/// Label of a logical single-qubit state.
///
/// The protocol only moves tags around; the amplitude vector behind each tag
/// is available for display and for fidelity checks, but no operation in the
/// protocol path evolves amplitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuantumStateTag {
    /// |0⟩
    #[serde(rename = "|0⟩")]
    Zero,
    /// |1⟩
    #[serde(rename = "|1⟩")]
    One,
    /// |+⟩ = (|0⟩ + |1⟩)/√2
    #[serde(rename = "|+⟩")]
    Plus,
    /// |−⟩ = (|0⟩ − |1⟩)/√2
    #[serde(rename = "|-⟩")]
    Minus,
}

impl QuantumStateTag {
    /// Every tag, in display order.
    pub const ALL: [QuantumStateTag; 4] = [Self::Zero, Self::One, Self::Plus, Self::Minus];

    /// Ket label used in records and exports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Zero => "|0⟩",
            Self::One => "|1⟩",
            Self::Plus => "|+⟩",
            Self::Minus => "|-⟩",
        }
    }

    /// Amplitudes `[⟨0|ψ⟩, ⟨1|ψ⟩]` of the tagged state.
    pub fn amplitudes(self) -> [Complex<f64>; 2] {
        let h = Complex::new(FRAC_1_SQRT_2, 0.0);
        match self {
            Self::Zero => [Complex::new(1.0, 0.0), Complex::zero()],
            Self::One => [Complex::zero(), Complex::new(1.0, 0.0)],
            Self::Plus => [h, h],
            Self::Minus => [h, -h],
        }
    }

    /// Fidelity `|⟨self|other⟩|²` between two tagged states.
    pub fn fidelity(self, other: QuantumStateTag) -> f64 {
        fidelity(&self.amplitudes(), &other.amplitudes())
    }
}

/// Fidelity `|⟨a|b⟩|²` between two single-qubit amplitude vectors.
pub fn fidelity(a: &[Complex<f64>; 2], b: &[Complex<f64>; 2]) -> f64 {
    let overlap: Complex<f64> = a.iter().zip(b.iter()).map(|(x, y)| x.conj() * y).sum();
    overlap.norm_sqr()
}

impl fmt::Display for QuantumStateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QuantumStateTag {
    type Err = TeleportError;

    /// Accepts ket notation (`|0⟩`, `|0>`) and bare labels (`0`, `1`, `+`, `-`, `plus`, `minus`).
    /// The original run menu's `X`/`H` aliases map to |1⟩ and |+⟩.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('|')
            .map(|rest| rest.trim_end_matches('⟩').trim_end_matches('>'))
            .unwrap_or(trimmed);
        match inner.to_ascii_lowercase().as_str() {
            "0" | "zero" => Ok(Self::Zero),
            "1" | "one" | "x" => Ok(Self::One),
            "+" | "plus" | "h" => Ok(Self::Plus),
            "-" | "minus" => Ok(Self::Minus),
            _ => Err(TeleportError::config(format!("Unknown initial state '{}' (expected one of |0⟩, |1⟩, |+⟩, |-⟩)", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_parse_aliases() -> Result<(), TeleportError> {
        assert_eq!("|0⟩".parse::<QuantumStateTag>()?, QuantumStateTag::Zero);
        assert_eq!("|1>".parse::<QuantumStateTag>()?, QuantumStateTag::One);
        assert_eq!("+".parse::<QuantumStateTag>()?, QuantumStateTag::Plus);
        assert_eq!(" |-⟩ ".parse::<QuantumStateTag>()?, QuantumStateTag::Minus);
        assert_eq!("H".parse::<QuantumStateTag>()?, QuantumStateTag::Plus);
        assert_eq!("X".parse::<QuantumStateTag>()?, QuantumStateTag::One);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "|2⟩".parse::<QuantumStateTag>().unwrap_err();
        assert!(matches!(err, TeleportError::Configuration { .. }));
    }

    #[test]
    fn test_label_roundtrips_through_parse() {
        for tag in QuantumStateTag::ALL {
            assert_eq!(tag.label().parse::<QuantumStateTag>().unwrap(), tag);
        }
    }

    #[test]
    fn test_amplitudes_are_normalized() {
        for tag in QuantumStateTag::ALL {
            let norm: f64 = tag.amplitudes().iter().map(|c| c.norm_sqr()).sum();
            assert!((norm - 1.0).abs() < TOL, "{} not normalized", tag);
        }
    }

    #[test]
    fn test_fidelity_between_bases() {
        use QuantumStateTag::*;
        assert!((Zero.fidelity(Zero) - 1.0).abs() < TOL);
        assert!(Zero.fidelity(One).abs() < TOL);
        assert!(Plus.fidelity(Minus).abs() < TOL);
        assert!((Zero.fidelity(Plus) - 0.5).abs() < TOL);
    }

    #[test]
    fn test_serde_uses_ket_labels() -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(&QuantumStateTag::Plus)?;
        assert_eq!(json, "\"|+⟩\"");
        let back: QuantumStateTag = serde_json::from_str(&json)?;
        assert_eq!(back, QuantumStateTag::Plus);
        Ok(())
    }
}
