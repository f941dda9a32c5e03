// src/core/memory.rs

use super::bell::BellStateKind;
use super::error::TeleportError;
use super::state::QuantumStateTag;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A named single-qubit memory slot holding at most one tagged state.
///
/// Memories are opaque containers: the protocol places a state in them,
/// reads it back, or consumes it, but never inspects amplitudes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantumMemory {
    name: String,
    state: Option<QuantumStateTag>,
}

impl QuantumMemory {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), state: None }
    }

    /// Creates a memory already holding `state`.
    pub fn with_state(name: impl Into<String>, state: QuantumStateTag) -> Self {
        Self { name: name.into(), state: Some(state) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> Option<QuantumStateTag> {
        self.state
    }

    pub fn store(&mut self, state: QuantumStateTag) {
        self.state = Some(state);
    }

    /// Removes the state; a Bell measurement destroys the original.
    pub fn take(&mut self) -> Option<QuantumStateTag> {
        self.state.take()
    }
}

impl fmt::Display for QuantumMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            Some(state) => write!(f, "Memory({}: {})", self.name, state),
            None => write!(f, "Memory({}: empty)", self.name),
        }
    }
}

/// Which end of an entangled pair a [`PairHalf`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairEnd {
    Sender,
    Receiver,
}

impl PairEnd {
    /// Protocol role holding this end.
    pub fn role(self) -> &'static str {
        match self {
            PairEnd::Sender => "sender",
            PairEnd::Receiver => "receiver",
        }
    }
}

/// Factory for pre-shared Bell pairs.
pub struct EntangledPair;

impl EntangledPair {
    /// Creates a fresh pair of the given kind and returns its two halves.
    ///
    /// The halves share a write-once collapse cell: the sender's Bell
    /// measurement fixes the state the receiver's half is left in, and no
    /// later measurement can overwrite it.
    pub fn create(kind: BellStateKind, sender_memory: &str, receiver_memory: &str) -> (PairHalf, PairHalf) {
        let link = Arc::new(OnceLock::new());
        let sender = PairHalf {
            kind,
            end: PairEnd::Sender,
            memory_name: sender_memory.to_string(),
            link: Arc::clone(&link),
        };
        let receiver = PairHalf {
            kind,
            end: PairEnd::Receiver,
            memory_name: receiver_memory.to_string(),
            link,
        };
        (sender, receiver)
    }
}

/// One half of a pre-shared Bell pair, stored in a node's EPR memory.
#[derive(Debug, Clone)]
pub struct PairHalf {
    kind: BellStateKind,
    end: PairEnd,
    memory_name: String,
    link: Arc<OnceLock<QuantumStateTag>>,
}

impl PairHalf {
    pub fn kind(&self) -> BellStateKind {
        self.kind
    }

    pub fn end(&self) -> PairEnd {
        self.end
    }

    pub fn memory_name(&self) -> &str {
        &self.memory_name
    }

    /// Records the state the receiver half collapses to. Only the sender end may
    /// collapse the pair, and only once.
    pub fn collapse(&self, receiver_state: QuantumStateTag) -> Result<(), TeleportError> {
        if self.end != PairEnd::Sender {
            return Err(TeleportError::protocol_state(
                self.end.role(),
                "PairHalf",
                format!(
                    "only the sender end may collapse the pair; memory {} is the {} end",
                    self.memory_name,
                    self.end.role()
                ),
            ));
        }
        self.link.set(receiver_state).map_err(|_| {
            TeleportError::protocol_state(
                self.end.role(),
                "PairHalf",
                format!("pair in memory {} was already consumed by an earlier measurement", self.memory_name),
            )
        })
    }

    /// State the receiver half was left in, if the pair has been measured.
    pub fn collapsed_state(&self) -> Option<QuantumStateTag> {
        self.link.get().copied()
    }

    pub fn is_collapsed(&self) -> bool {
        self.link.get().is_some()
    }
}

impl fmt::Display for PairHalf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind.label(), self.end.role())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_is_visible_on_both_halves() -> Result<(), TeleportError> {
        let (alice, bob) = EntangledPair::create(BellStateKind::PhiPlus, "sender_epr", "receiver_epr");
        assert!(!bob.is_collapsed());
        alice.collapse(QuantumStateTag::Minus)?;
        assert_eq!(bob.collapsed_state(), Some(QuantumStateTag::Minus));
        assert_eq!(alice.collapsed_state(), Some(QuantumStateTag::Minus));
        Ok(())
    }

    #[test]
    fn test_pair_collapses_once() -> Result<(), TeleportError> {
        let (alice, _bob) = EntangledPair::create(BellStateKind::PsiMinus, "a", "b");
        alice.collapse(QuantumStateTag::Zero)?;
        assert!(matches!(alice.collapse(QuantumStateTag::One), Err(TeleportError::ProtocolState { .. })));
        assert_eq!(alice.collapsed_state(), Some(QuantumStateTag::Zero));
        Ok(())
    }

    #[test]
    fn test_receiver_half_cannot_collapse() {
        let (_alice, bob) = EntangledPair::create(BellStateKind::PhiPlus, "sender_epr", "receiver_epr");
        match bob.collapse(QuantumStateTag::Zero) {
            Err(TeleportError::ProtocolState { role, state, message }) => {
                assert_eq!(role, "receiver");
                assert_eq!(state, "PairHalf");
                assert!(message.contains("receiver_epr"), "{message}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!bob.is_collapsed());
    }

    #[test]
    fn test_memory_take_empties_slot() {
        let mut memory = QuantumMemory::with_state("sender_unknown", QuantumStateTag::Plus);
        assert_eq!(memory.take(), Some(QuantumStateTag::Plus));
        assert_eq!(memory.state(), None);
        assert_eq!(memory.to_string(), "Memory(sender_unknown: empty)");
    }
}
