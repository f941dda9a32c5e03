// src/core/time.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// A point in (or span of) simulated time, in picoseconds.
///
/// The same type is used for absolute timeline positions and for delays;
/// the timeline only ever moves forward, so values are unsigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(u64);

impl SimTime {
    /// The start of every timeline.
    pub const ZERO: SimTime = SimTime(0);

    pub const fn new(picoseconds: u64) -> Self {
        Self(picoseconds)
    }

    pub const fn picoseconds(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `self + delay`, or `None` if it would overflow.
    pub fn checked_add(self, delay: SimTime) -> Option<SimTime> {
        self.0.checked_add(delay.0).map(SimTime)
    }

    /// Converts a signed picosecond count, rejecting negatives.
    pub fn from_signed(value: i64) -> Option<SimTime> {
        u64::try_from(value).ok().map(SimTime)
    }
}

impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ps", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_signed_rejects_negative() {
        assert_eq!(SimTime::from_signed(-1), None);
        assert_eq!(SimTime::from_signed(0), Some(SimTime::ZERO));
        assert_eq!(SimTime::from_signed(500), Some(SimTime::new(500)));
    }

    #[test]
    fn test_checked_add_overflow() {
        assert_eq!(SimTime::new(u64::MAX).checked_add(SimTime::new(1)), None);
        assert_eq!(SimTime::new(2).checked_add(SimTime::new(3)), Some(SimTime::new(5)));
    }
}
