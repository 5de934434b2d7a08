//! Loop state and backoff arithmetic.

use crate::types::Enrollment;
use std::time::Duration;

/// What a successful poll means relative to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Seats are open and the last observation was full (or there was none).
    Opened { spots: u32 },
    /// Seats are open and were already open last time.
    StillOpen { spots: u32 },
    /// The section filled up after being open.
    FullAgain,
    /// Full, and it was full before.
    StillFull,
}

/// Mutable loop state, owned by the controller for the process lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorState {
    pub consecutive_failures: u32,
    /// True exactly while the last observation was "seat open".
    pub notified: bool,
}

impl MonitorState {
    /// Count a failed poll; returns the new failure count.
    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Fold a successful observation into the state.
    pub fn observe(&mut self, enrollment: Enrollment) -> Transition {
        if enrollment.is_open() {
            let spots = enrollment.open_spots();
            let was_open = std::mem::replace(&mut self.notified, true);
            if was_open {
                Transition::StillOpen { spots }
            } else {
                Transition::Opened { spots }
            }
        } else if std::mem::replace(&mut self.notified, false) {
            Transition::FullAgain
        } else {
            Transition::StillFull
        }
    }
}

/// `min(base * 2^failures, max)`, saturating to `max` on overflow.
pub fn backoff(base: Duration, failures: u32, max: Duration) -> Duration {
    2u32.checked_pow(failures)
        .and_then(|factor| base.checked_mul(factor))
        .map_or(max, |wait| wait.min(max))
}
