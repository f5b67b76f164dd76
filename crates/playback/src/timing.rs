//! Frame pacing and loop policy.
//!
//! Small value types the state machine composes: the interval choice between
//! a fixed override and decoder-reported timing, the loop limit with its
//! pass counter, and the deferred-start gate.

use crate::decoder::FrameTiming;

/// Interval until the next frame advance.
///
/// A non-zero `override_ms` wins; otherwise the decoder-reported timing of
/// the upcoming frame is used (see [`FrameTiming::interval_ms`]).
#[must_use]
pub fn frame_interval_ms(override_ms: Option<u32>, timing: FrameTiming) -> u32 {
    match override_ms {
        Some(ms) if ms > 0 => ms,
        _ => timing.interval_ms(),
    }
}

/// How many full passes to play before stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopLimit {
    /// Never stop on our own.
    #[default]
    Forever,
    /// Stop after this many passes (always ≥ 1).
    Times(u32),
}

impl LoopLimit {
    /// Map a host loop count: negative
    /// ([`LOOP_FOREVER`](platform::config::LOOP_FOREVER)) repeats forever,
    /// `0` plays once, `n` plays `n` passes.
    #[must_use]
    pub fn from_times(times: i32) -> Self {
        if times < 0 {
            Self::Forever
        } else {
            Self::Times(times.unsigned_abs().max(1))
        }
    }

    /// `true` unless [`LoopLimit::Forever`].
    #[must_use]
    pub fn is_bounded(self) -> bool {
        matches!(self, Self::Times(_))
    }
}

/// Completed passes under a bounded [`LoopLimit`].
///
/// `None` is the "not counting" sentinel: the counter only starts when the
/// first pass completes and returns to the sentinel whenever playback stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopCounter(Option<u32>);

impl LoopCounter {
    /// Sentinel value.
    pub const RESET: Self = Self(None);

    /// Count one completed pass and return the new total.
    pub fn record_pass(&mut self) -> u32 {
        let next = self.0.map_or(1, |n| n.saturating_add(1));
        self.0 = Some(next);
        next
    }

    /// Return to the sentinel.
    pub fn reset(&mut self) {
        self.0 = None;
    }

    /// Completed passes, or `None` while at the sentinel.
    #[must_use]
    pub fn get(self) -> Option<u32> {
        self.0
    }

    /// `true` once `limit` passes have been recorded.
    #[must_use]
    pub fn reached(self, limit: LoopLimit) -> bool {
        match (limit, self.0) {
            (LoopLimit::Times(max), Some(n)) => n >= max,
            _ => false,
        }
    }
}

/// Result of one paint tick spent inside a delay budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DelayStep {
    /// Budget not yet met: skip this tick.
    Suppress,
    /// Budget met on this tick: show the held frame once.
    Elapsed,
}

/// Deferred-start bookkeeping.
///
/// Elapsed time is counted in timer periods, one per paint tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DelayGate {
    budget_ms: u32,
    elapsed_steps: u32,
}

impl DelayGate {
    /// Gate for `budget_ms`, or `None` for a zero budget (no delay).
    #[must_use]
    pub fn new(budget_ms: u32) -> Option<Self> {
        (budget_ms > 0).then_some(Self {
            budget_ms,
            elapsed_steps: 0,
        })
    }

    /// Configured budget.
    #[must_use]
    pub fn budget_ms(&self) -> u32 {
        self.budget_ms
    }

    /// Ticks consumed so far.
    #[must_use]
    pub fn elapsed_steps(&self) -> u32 {
        self.elapsed_steps
    }

    /// Consume one tick of `duration_ms`.
    ///
    /// A zero duration counts as 1 ms so the gate always opens eventually.
    pub fn step(&mut self, duration_ms: u32) -> DelayStep {
        self.elapsed_steps = self.elapsed_steps.saturating_add(1);
        let elapsed = self.elapsed_steps.saturating_mul(duration_ms.max(1));
        if elapsed < self.budget_ms {
            DelayStep::Suppress
        } else {
            DelayStep::Elapsed
        }
    }
}
