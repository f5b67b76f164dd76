//! Playback state machine.
//!
//! `PlaybackEngine` is a pure, `no_std`, allocation-free state machine that
//! tracks whether an animated image is stopped, holding a frame, or waiting to
//! advance, together with the loop policy and an optional deferred start.
//!
//! It has **no** I/O: it does not arm timers, call decoders, or touch the
//! compositor. The [`AnimatedImage`](crate::widget::AnimatedImage) controller
//! reads the plans returned here and performs the side effects.

use crate::timing::{DelayGate, DelayStep, LoopCounter, LoopLimit};

/// Current playback status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// No decoder is open; paint ticks are ignored.
    #[default]
    Stopped,
    /// A frame is decoded and displayed; waiting for the frame timer.
    HoldingFrame,
    /// The frame timer fired; the next paint tick decodes the following frame.
    AdvancePending,
}

/// What the controller must do on a paint tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickPlan {
    /// Stopped: nothing to draw.
    Idle,
    /// Inside the delay budget: re-arm the timer and skip the frame.
    DelaySuppressed,
    /// Delay budget met on this tick: push the held frame once.
    DelayElapsed,
    /// Render a frame; `advance` selects next frame vs. redraw.
    Draw {
        /// Decode the following frame instead of redrawing the current one.
        advance: bool,
    },
}

/// What the controller must do after a frame has been drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AfterFrame {
    /// A frame advanced: re-arm the timer for the next interval.
    Rearm,
    /// The current frame was redrawn: the pending timer stays as it is.
    Hold,
    /// The loop limit was reached: stop and report completion.
    Finished,
}

/// Pure state machine for frame-sequence playback.
///
/// All fields are private; state is mutated only through the method API.
/// No allocations, no I/O, no hardware dependencies.
#[derive(Debug, Clone, Default)]
pub struct PlaybackEngine {
    status: Status,
    limit: LoopLimit,
    passes: LoopCounter,
    delay: Option<DelayGate>,
}

impl PlaybackEngine {
    /// Create a stopped engine that loops forever.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin playback so the first frame renders on the next paint tick.
    ///
    /// Transitions:
    /// - `Stopped        → AdvancePending`  returns `true` (arm the timer)
    /// - `HoldingFrame   → HoldingFrame`    returns `false`
    /// - `AdvancePending → AdvancePending`  returns `false`
    pub fn start(&mut self) -> bool {
        match self.status {
            Status::Stopped => {
                self.status = Status::AdvancePending;
                true
            }
            Status::HoldingFrame | Status::AdvancePending => false,
        }
    }

    /// The frame timer expired.
    ///
    /// Transitions:
    /// - `HoldingFrame   → AdvancePending`  returns `true` (repaint)
    /// - `AdvancePending → AdvancePending`  returns `true` (coalesced)
    /// - `Stopped        → Stopped`         returns `false`
    pub fn timer_fired(&mut self) -> bool {
        match self.status {
            Status::Stopped => false,
            Status::HoldingFrame | Status::AdvancePending => {
                self.status = Status::AdvancePending;
                true
            }
        }
    }

    /// Stop playback: status to `Stopped`, loop counter to its sentinel, and
    /// any delay budget dropped.
    ///
    /// Always succeeds; stopping a stopped engine is a no-op.
    pub fn stop(&mut self) {
        self.status = Status::Stopped;
        self.passes.reset();
        self.delay = None;
    }

    /// Install a deferred-start budget. `0` clears it.
    pub fn set_delay(&mut self, budget_ms: u32) {
        self.delay = DelayGate::new(budget_ms);
    }

    /// Replace the loop limit. A running pass counter is kept.
    pub fn set_loop_limit(&mut self, limit: LoopLimit) {
        self.limit = limit;
    }

    /// Plan one paint tick. `timer_duration_ms` is the frame timer's current
    /// period, used to advance the delay budget.
    pub fn begin_tick(&mut self, timer_duration_ms: u32) -> TickPlan {
        if self.status == Status::Stopped {
            return TickPlan::Idle;
        }
        if let Some(gate) = self.delay.as_mut() {
            return match gate.step(timer_duration_ms) {
                DelayStep::Suppress => TickPlan::DelaySuppressed,
                DelayStep::Elapsed => {
                    self.delay = None;
                    TickPlan::DelayElapsed
                }
            };
        }
        TickPlan::Draw {
            advance: self.status == Status::AdvancePending,
        }
    }

    /// Record a drawn frame.
    ///
    /// `completed_pass` is `true` when the decoder just produced the last
    /// frame of the sequence. Only advancing draws count passes, and only
    /// while the loop limit is bounded.
    ///
    /// Transitions:
    /// - advanced, limit not reached  `→ HoldingFrame`  returns `Rearm`
    /// - advanced, limit reached      `→ (unchanged)`   returns `Finished`
    /// - redraw                       `→ HoldingFrame`  returns `Hold`
    ///
    /// On `Finished` the caller is expected to [`stop`](Self::stop) the
    /// engine as part of pausing the widget.
    pub fn frame_drawn(&mut self, advanced: bool, completed_pass: bool) -> AfterFrame {
        if !advanced {
            self.status = Status::HoldingFrame;
            return AfterFrame::Hold;
        }
        if self.limit.is_bounded() && completed_pass {
            self.passes.record_pass();
            if self.passes.reached(self.limit) {
                return AfterFrame::Finished;
            }
        }
        self.status = Status::HoldingFrame;
        AfterFrame::Rearm
    }

    /// Return the current [`Status`].
    pub fn status(&self) -> Status {
        self.status
    }

    /// Return the configured [`LoopLimit`].
    pub fn loop_limit(&self) -> LoopLimit {
        self.limit
    }

    /// Completed passes, or `None` when not counting.
    pub fn loops_completed(&self) -> Option<u32> {
        self.passes.get()
    }

    /// Active delay budget, if any.
    pub fn delay(&self) -> Option<&DelayGate> {
        self.delay.as_ref()
    }
}
