//! Timer port.
//!
//! The controller allows exactly one pending timer. It always cancels the
//! previous token before arming a new one; implementations only need to
//! deliver `TimerFired(token)` back to the controller's queue after `delay`.

use std::time::Duration;

use crate::domain::TimerToken;

/// Schedules delayed callbacks into the controller's event queue.
pub trait TimerPort: Send {
    /// Fire `token` once after `delay`.
    fn arm(&mut self, token: TimerToken, delay: Duration);

    /// Drop a previously armed token. Unknown or already-fired tokens are ignored.
    fn cancel(&mut self, token: TimerToken);
}
