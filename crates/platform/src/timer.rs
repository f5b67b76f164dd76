//! Frame pacing timer abstraction.
//!
//! Frame advances are paced by a single-shot timer. The render task owns the
//! timer and polls it from its cooperative loop; nothing ever blocks waiting
//! for a deadline. The controller re-arms explicitly after every fire.

use embassy_time::{Duration, Instant};

/// Single-shot timer driving frame advances.
pub trait FrameTimer {
    /// Arm (or re-arm) the timer to expire `duration_ms` from now.
    ///
    /// Re-arming replaces any pending deadline.
    fn arm(&mut self, duration_ms: u32);

    /// Cancel a pending deadline. No-op if the timer is idle.
    fn cancel(&mut self);

    /// `true` while a deadline is pending.
    fn is_armed(&self) -> bool;

    /// Duration passed to the most recent [`arm`](FrameTimer::arm) call.
    ///
    /// Kept after the timer fires or is cancelled; 0 if never armed.
    fn duration_ms(&self) -> u32;

    /// Return `true` exactly once when the pending deadline has passed, and
    /// disarm the timer.
    fn poll_expired(&mut self) -> bool;
}

/// Deadline timer on top of `embassy_time`.
///
/// Works with whichever time driver the target links: the hardware tick
/// driver on the MCU, or embassy-time's `std` driver on the host.
#[derive(Debug, Default)]
pub struct EmbassyFrameTimer {
    deadline: Option<Instant>,
    duration_ms: u32,
}

impl EmbassyFrameTimer {
    /// Create an idle timer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            deadline: None,
            duration_ms: 0,
        }
    }

    /// Pending deadline, if armed.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl FrameTimer for EmbassyFrameTimer {
    fn arm(&mut self, duration_ms: u32) {
        self.duration_ms = duration_ms;
        let delay = Duration::from_millis(u64::from(duration_ms));
        self.deadline = Instant::now().checked_add(delay);
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }

    fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    fn poll_expired(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
