//! Monotonic identifiers that let the controller drop stale callbacks.
//!
//! Engine and timer callbacks may arrive after the attempt or timer they
//! belong to has already been replaced. Every callback carries the id it was
//! issued with; anything that does not match the current id is ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one recognition or speech attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttemptId(pub u64);

impl AttemptId {
    /// Return this id and advance `self` to the next one.
    pub const fn advance(&mut self) -> Self {
        let current = *self;
        self.0 += 1;
        current
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt#{}", self.0)
    }
}

/// Identifies one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

impl TimerToken {
    /// Return this token and advance `self` to the next one.
    pub const fn advance(&mut self) -> Self {
        let current = *self;
        self.0 += 1;
        current
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_hands_out_increasing_ids() {
        let mut next = AttemptId(1);
        assert_eq!(next.advance(), AttemptId(1));
        assert_eq!(next.advance(), AttemptId(2));
        assert_eq!(next, AttemptId(3));
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(TimerToken(7).to_string(), "timer#7");
    }
}
