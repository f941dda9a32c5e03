// src/operations/mod.rs

//! Defines the corrective operations the receiver applies after a Bell
//! measurement, and the rule table that selects them.
//!
//! The rule is a pure, total function of the pre-shared Bell state and the
//! two classical bits:
//!
//! | bell kind | (0,0) | (0,1) | (1,0) | (1,1) |
//! |---|---|---|---|---|
//! | Φ⁺ | {} | {X} | {Z} | {X,Z} |
//! | Ψ⁻ | {X} | {} | {X,Z} | {Z} |
//!
//! Z is applied iff `b1 = 1`. X is applied iff `b2 = 1` for Φ⁺ and iff `b2 = 0`
//! for Ψ⁻. When both are needed, X is applied before Z.

use crate::core::{BellStateKind, MeasurementOutcome, QuantumStateTag};
use num_complex::Complex;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single Pauli correction gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Correction {
    /// Bit flip.
    X,
    /// Phase flip.
    Z,
}

impl Correction {
    /// The gate's 2×2 unitary in the computational basis.
    pub fn matrix(self) -> [[Complex<f64>; 2]; 2] {
        let (o, z) = (Complex::one(), Complex::zero());
        match self {
            Correction::X => [[z, o], [o, z]],
            Correction::Z => [[o, z], [z, -o]],
        }
    }

    /// Action of the gate on a state tag, up to global phase.
    ///
    /// X swaps |0⟩ and |1⟩ and fixes |±⟩; Z swaps |+⟩ and |−⟩ and fixes |0⟩, |1⟩.
    pub fn apply(self, state: QuantumStateTag) -> QuantumStateTag {
        use QuantumStateTag::*;
        match (self, state) {
            (Correction::X, Zero) => One,
            (Correction::X, One) => Zero,
            (Correction::Z, Plus) => Minus,
            (Correction::Z, Minus) => Plus,
            (_, unchanged) => unchanged,
        }
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correction::X => f.write_str("X"),
            Correction::Z => f.write_str("Z"),
        }
    }
}

/// The ordered set of corrections for one (bell kind, outcome) pair.
///
/// Always derived through [`resolve`]; never stored apart from the pair it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CorrectionSet {
    Identity,
    X,
    Z,
    /// X first, then Z.
    XThenZ,
}

impl CorrectionSet {
    /// Every set, in the order the reporting layer lists them.
    pub const ALL: [CorrectionSet; 4] = [Self::Identity, Self::X, Self::Z, Self::XThenZ];

    /// Builds the set from which gates are required; the order is fixed, not incidental.
    pub const fn from_flags(apply_x: bool, apply_z: bool) -> Self {
        match (apply_x, apply_z) {
            (false, false) => Self::Identity,
            (true, false) => Self::X,
            (false, true) => Self::Z,
            (true, true) => Self::XThenZ,
        }
    }

    /// Gates in application order.
    pub fn gates(self) -> &'static [Correction] {
        match self {
            Self::Identity => &[],
            Self::X => &[Correction::X],
            Self::Z => &[Correction::Z],
            Self::XThenZ => &[Correction::X, Correction::Z],
        }
    }

    pub fn len(self) -> usize {
        self.gates().len()
    }

    pub fn is_empty(self) -> bool {
        self == Self::Identity
    }

    /// Pattern label used by the statistics layer.
    pub fn label(self) -> &'static str {
        match self {
            Self::Identity => "None",
            Self::X => "X",
            Self::Z => "Z",
            Self::XThenZ => "X+Z",
        }
    }

    /// Recovers the set from an ordered gate list, as found in exported records.
    pub fn from_gates(gates: &[Correction]) -> Option<Self> {
        match gates {
            [] => Some(Self::Identity),
            [Correction::X] => Some(Self::X),
            [Correction::Z] => Some(Self::Z),
            [Correction::X, Correction::Z] => Some(Self::XThenZ),
            _ => None,
        }
    }

    /// Applies the gates to `state` in order.
    pub fn apply(self, state: QuantumStateTag) -> QuantumStateTag {
        self.gates().iter().fold(state, |acc, gate| gate.apply(acc))
    }

    /// Applies the inverse: the gates are self-inverse, so this is the reverse order.
    pub fn undo(self, state: QuantumStateTag) -> QuantumStateTag {
        self.gates().iter().rev().fold(state, |acc, gate| gate.apply(acc))
    }
}

impl fmt::Display for CorrectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gates: Vec<String> = self.gates().iter().map(|g| g.to_string()).collect();
        write!(f, "[{}]", gates.join(", "))
    }
}

/// Resolves the corrections the receiver must apply.
///
/// Pure and total: every (kind, outcome) pair is defined.
pub fn resolve(bell_kind: BellStateKind, outcome: MeasurementOutcome) -> CorrectionSet {
    let apply_z = outcome.bit1() == 1;
    let apply_x = match bell_kind {
        BellStateKind::PhiPlus => outcome.bit2() == 1,
        BellStateKind::PsiMinus => outcome.bit2() == 0,
    };
    CorrectionSet::from_flags(apply_x, apply_z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fidelity;

    const TOL: f64 = 1e-12;

    fn outcome(b1: u8, b2: u8) -> MeasurementOutcome {
        MeasurementOutcome::new(b1, b2).unwrap()
    }

    fn apply_matrix(m: &[[Complex<f64>; 2]; 2], v: &[Complex<f64>; 2]) -> [Complex<f64>; 2] {
        [m[0][0] * v[0] + m[0][1] * v[1], m[1][0] * v[0] + m[1][1] * v[1]]
    }

    #[test]
    fn test_phi_plus_table() {
        let k = BellStateKind::PhiPlus;
        assert_eq!(resolve(k, outcome(0, 0)), CorrectionSet::Identity);
        assert_eq!(resolve(k, outcome(0, 1)), CorrectionSet::X);
        assert_eq!(resolve(k, outcome(1, 0)), CorrectionSet::Z);
        assert_eq!(resolve(k, outcome(1, 1)), CorrectionSet::XThenZ);
    }

    #[test]
    fn test_psi_minus_table() {
        let k = BellStateKind::PsiMinus;
        assert_eq!(resolve(k, outcome(0, 0)), CorrectionSet::X);
        assert_eq!(resolve(k, outcome(0, 1)), CorrectionSet::Identity);
        assert_eq!(resolve(k, outcome(1, 0)), CorrectionSet::XThenZ);
        assert_eq!(resolve(k, outcome(1, 1)), CorrectionSet::Z);
    }

    #[test]
    fn test_rule_derivation_holds_for_every_pair() {
        for kind in BellStateKind::ALL {
            for o in MeasurementOutcome::ALL {
                let gates = resolve(kind, o).gates();
                let has_z = gates.contains(&Correction::Z);
                let has_x = gates.contains(&Correction::X);
                assert_eq!(has_z, o.bit1() == 1, "{} {}", kind, o);
                let expect_x = match kind {
                    BellStateKind::PhiPlus => o.bit2() == 1,
                    BellStateKind::PsiMinus => o.bit2() == 0,
                };
                assert_eq!(has_x, expect_x, "{} {}", kind, o);
                if has_x && has_z {
                    assert_eq!(gates, &[Correction::X, Correction::Z]);
                }
                // Deterministic
                assert_eq!(resolve(kind, o), resolve(kind, o));
            }
        }
    }

    #[test]
    fn test_tag_action_matches_matrix_up_to_phase() {
        for gate in [Correction::X, Correction::Z] {
            for tag in QuantumStateTag::ALL {
                let evolved = apply_matrix(&gate.matrix(), &tag.amplitudes());
                let expected = gate.apply(tag).amplitudes();
                assert!(
                    (fidelity(&evolved, &expected) - 1.0).abs() < TOL,
                    "{} on {} should give {}",
                    gate,
                    tag,
                    gate.apply(tag)
                );
            }
        }
    }

    #[test]
    fn test_undo_then_apply_is_identity() {
        for set in CorrectionSet::ALL {
            for tag in QuantumStateTag::ALL {
                assert_eq!(set.apply(set.undo(tag)), tag);
            }
        }
    }

    #[test]
    fn test_from_gates_rejects_wrong_order() {
        assert_eq!(CorrectionSet::from_gates(&[Correction::Z, Correction::X]), None);
        for set in CorrectionSet::ALL {
            assert_eq!(CorrectionSet::from_gates(set.gates()), Some(set));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(CorrectionSet::XThenZ.to_string(), "[X, Z]");
        assert_eq!(CorrectionSet::Identity.to_string(), "[]");
        assert_eq!(CorrectionSet::XThenZ.label(), "X+Z");
    }
}
