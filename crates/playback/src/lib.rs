//! Animated frame-sequence playback: decoder interface, timing and loop
//! policy, indexed asset selection, and the `AnimatedImage` controller.
//!
//! The controller is a plain owned object driven by the host render task:
//! [`widget::AnimatedImage::poll_timer`] turns timer expiry into a pending
//! advance, and [`widget::AnimatedImage::on_paint_tick`] decodes and
//! composites. See [`engine`] for the underlying state machine.
//!
//! # Features
//!
//! - `defmt`: log through defmt and derive `defmt::Format` (hardware builds)
//! - `tracing`: log through tracing (desktop builds and demos)
#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

#[macro_use]
mod fmt;

pub mod asset_path;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod raw_sequence;
pub mod timing;
pub mod widget;

#[cfg(test)]
mod scripted;

pub use decoder::{AnimationDecoder, AnimationHeader, DecodeError, DecoderHandle, FrameTiming};
pub use engine::Status;
pub use error::PlaybackError;
pub use raw_sequence::RawSequenceDecoder;
pub use widget::{AnimatedImage, PaintOutcome, PlayEndCallback};

#[cfg(test)]
#[allow(clippy::expect_used)] // Tests use expect() for readable assertions
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    /// Decoder abstraction tests
    mod decoder_tests {
        use crate::decoder::{DecodeError, FrameTiming};

        #[test]
        fn test_interval_from_fraction() {
            let t = FrameTiming {
                delay_num: 1,
                delay_den: 25,
            };
            assert_eq!(t.interval_ms(), 40);
        }

        #[test]
        fn test_zero_denominator_normalised() {
            let t = FrameTiming {
                delay_num: 50,
                delay_den: 0,
            };
            assert_eq!(t.interval_ms(), 500);
        }

        #[test]
        fn test_interval_does_not_overflow() {
            let t = FrameTiming {
                delay_num: u16::MAX,
                delay_den: 1,
            };
            assert_eq!(t.interval_ms(), u32::from(u16::MAX) * 1000);
        }

        #[test]
        fn test_decode_error_displays() {
            let s = format!("{}", DecodeError::InvalidData);
            assert!(!s.is_empty());
        }
    }

    /// Playback state machine tests
    mod engine_tests {
        use crate::engine::{AfterFrame, PlaybackEngine, Status, TickPlan};
        use crate::timing::LoopLimit;

        #[test]
        fn test_engine_starts_stopped() {
            let engine = PlaybackEngine::new();
            assert_eq!(engine.status(), Status::Stopped);
            assert_eq!(engine.loop_limit(), LoopLimit::Forever);
        }

        #[test]
        fn test_start_requests_first_frame() {
            let mut engine = PlaybackEngine::new();
            assert!(engine.start(), "start from stopped arms the timer");
            assert_eq!(engine.status(), Status::AdvancePending);
            assert!(!engine.start(), "second start is a no-op");
        }

        #[test]
        fn test_stopped_ticks_are_idle() {
            let mut engine = PlaybackEngine::new();
            assert_eq!(engine.begin_tick(100), TickPlan::Idle);
            assert!(!engine.timer_fired());
            assert_eq!(engine.status(), Status::Stopped);
        }

        #[test]
        fn test_timer_fire_sets_advance_pending() {
            let mut engine = PlaybackEngine::new();
            engine.start();
            assert_eq!(engine.begin_tick(100), TickPlan::Draw { advance: true });
            assert_eq!(engine.frame_drawn(true, false), AfterFrame::Rearm);
            assert_eq!(engine.status(), Status::HoldingFrame);
            assert_eq!(engine.begin_tick(100), TickPlan::Draw { advance: false });
            assert_eq!(engine.frame_drawn(false, false), AfterFrame::Hold);
            assert!(engine.timer_fired());
            assert_eq!(engine.status(), Status::AdvancePending);
        }

        #[test]
        fn test_bounded_loop_finishes() {
            let mut engine = PlaybackEngine::new();
            engine.set_loop_limit(LoopLimit::Times(2));
            engine.start();
            assert_eq!(engine.frame_drawn(true, true), AfterFrame::Rearm);
            assert_eq!(engine.loops_completed(), Some(1));
            assert_eq!(engine.frame_drawn(true, false), AfterFrame::Rearm);
            assert_eq!(engine.frame_drawn(true, true), AfterFrame::Finished);
            engine.stop();
            assert_eq!(engine.loops_completed(), None);
        }

        #[test]
        fn test_redraw_of_last_frame_is_not_a_pass() {
            let mut engine = PlaybackEngine::new();
            engine.set_loop_limit(LoopLimit::Times(1));
            engine.start();
            assert_eq!(engine.frame_drawn(false, true), AfterFrame::Hold);
            assert_eq!(engine.loops_completed(), None);
        }

        #[test]
        fn test_forever_never_counts() {
            let mut engine = PlaybackEngine::new();
            engine.start();
            for _ in 0..1000 {
                assert_eq!(engine.frame_drawn(true, true), AfterFrame::Rearm);
            }
            assert_eq!(engine.loops_completed(), None);
        }

        #[test]
        fn test_delay_gate_then_draw() {
            let mut engine = PlaybackEngine::new();
            engine.start();
            engine.set_delay(500);
            for _ in 0..4 {
                assert_eq!(engine.begin_tick(100), TickPlan::DelaySuppressed);
            }
            assert_eq!(engine.begin_tick(100), TickPlan::DelayElapsed);
            assert_eq!(engine.status(), Status::AdvancePending);
            assert_eq!(engine.begin_tick(100), TickPlan::Draw { advance: true });
        }

        #[test]
        fn test_stop_clears_delay() {
            let mut engine = PlaybackEngine::new();
            engine.start();
            engine.set_delay(500);
            engine.stop();
            assert!(engine.delay().is_none());
            engine.start();
            assert_eq!(engine.begin_tick(100), TickPlan::Draw { advance: true });
        }
    }

    /// Controller tests against the scripted decoder and platform mocks
    mod widget_tests {
        use core::sync::atomic::{AtomicUsize, Ordering};

        use embedded_graphics::geometry::{Point, Size};
        use embedded_graphics::primitives::Rectangle;
        use platform::mocks::{BoundSource, MockCompositor, MockElement, MockTimer};
        use platform::{CompositorError, FrameTimer, Opacity, Zoom};

        use crate::asset_path::PathError;
        use crate::decoder::{DecodeError, FrameTiming};
        use crate::engine::Status;
        use crate::error::PlaybackError;
        use crate::scripted::ScriptedDecoder;
        use crate::timing::LoopLimit;
        use crate::widget::{AnimatedImage, PaintOutcome, PlayEndCallback};

        type Widget = AnimatedImage<ScriptedDecoder, MockTimer, MockCompositor>;

        fn widget_with(decoder: ScriptedDecoder) -> Widget {
            AnimatedImage::create(
                MockCompositor::SCREEN,
                decoder,
                MockTimer::new(),
                MockCompositor::new(),
            )
            .expect("mock compositor has room")
        }

        fn widget(frames: u16) -> Widget {
            widget_with(ScriptedDecoder::new(frames))
        }

        fn clip() -> Rectangle {
            Rectangle::new(Point::zero(), Size::new(2, 2))
        }

        fn tick(w: &mut Widget) -> PaintOutcome {
            w.on_paint_tick(clip()).expect("paint tick")
        }

        fn fire(w: &mut Widget) {
            w.timer_mut().expire();
            assert!(w.poll_timer(), "armed timer must fire");
        }

        fn container(w: &Widget) -> &MockElement {
            w.compositor().element(w.element()).expect("container exists")
        }

        fn surface(w: &Widget) -> &MockElement {
            let id = w.surface_element().expect("surface created");
            w.compositor().element(id).expect("surface exists")
        }

        #[test]
        fn test_set_source_opens_and_sizes() {
            let mut w = widget(3);
            w.set_source("spin.bin").expect("open");
            assert!(w.is_open());
            assert_eq!(w.status(), Status::Stopped);
            assert_eq!(w.source(), Some("spin.bin"));
            assert_eq!(container(&w).size, Size::new(2, 2));
            let desc = w.descriptor().expect("descriptor prepared");
            assert_eq!(desc.data_size, 2 * 2 * 3);
        }

        #[test]
        fn test_open_failure_is_reported() {
            let mut decoder = ScriptedDecoder::new(3);
            decoder.fail_open_prefix = Some("bad");
            let mut w = widget_with(decoder);
            assert_eq!(
                w.set_source("bad.bin"),
                Err(PlaybackError::Open(DecodeError::NotFound))
            );
            assert_eq!(w.source(), None);
            assert!(!w.is_open());
            assert_eq!(w.status(), Status::Stopped);
        }

        #[test]
        fn test_resume_without_source() {
            let mut w = widget(3);
            assert_eq!(w.resume(), Err(PlaybackError::NoSource));
            assert_eq!(w.status(), Status::Stopped);
        }

        #[test]
        fn test_resume_arms_and_requests_first_frame() {
            let mut w = widget(3);
            w.set_source("spin.bin").expect("open");
            w.resume().expect("resume");
            assert_eq!(w.status(), Status::AdvancePending);
            assert!(w.timer().is_armed());
            assert_eq!(w.timer().duration_ms(), 100);
            assert!(container(&w).invalidations >= 1);
            assert_eq!(w.decoder().opens, 1);
        }

        #[test]
        fn test_resume_reopens_after_pause() {
            let mut w = widget(3);
            w.set_source("spin.bin").expect("open");
            w.pause();
            assert!(!w.is_open());
            w.resume().expect("resume reopens");
            assert_eq!(w.decoder().opens, 2);
            assert_eq!(w.decoder().live_handles(), 1);
            assert_eq!(w.status(), Status::AdvancePending);
        }

        #[test]
        fn test_pause_is_idempotent() {
            let mut w = widget(3);
            w.set_loop_times(5);
            w.set_source("spin.bin").expect("open");
            w.resume().expect("resume");
            tick(&mut w);
            w.pause();
            w.pause();
            assert_eq!(w.status(), Status::Stopped);
            assert!(!w.is_open());
            assert!(!w.timer().is_armed());
            assert_eq!(w.decoder().live_handles(), 0);
            assert_eq!(w.loops_completed(), None);
        }

        #[test]
        fn test_frames_advance_only_after_timer() {
            let mut w = widget(3);
            w.set_source("spin.bin").expect("open");
            w.set_surface("bg.bin").expect("surface");
            w.resume().expect("resume");

            assert_eq!(tick(&mut w), PaintOutcome::Advanced);
            assert!(matches!(
                surface(&w).source,
                BoundSource::Frame { first_byte: Some(0), .. }
            ));
            assert_eq!(tick(&mut w), PaintOutcome::Redrawn);
            fire(&mut w);
            assert_eq!(tick(&mut w), PaintOutcome::Advanced);
            assert!(matches!(
                surface(&w).source,
                BoundSource::Frame { first_byte: Some(1), .. }
            ));
        }

        #[test]
        fn test_surface_rebinds_on_pause() {
            let mut w = widget(3);
            w.set_source("spin.bin").expect("open");
            w.set_surface("bg.bin").expect("surface");
            assert_eq!(surface(&w).raised, 1);
            assert!(surface(&w).centered);
            w.resume().expect("resume");
            assert!(matches!(surface(&w).source, BoundSource::Frame { .. }));
            w.pause();
            let mut expected = heapless::String::new();
            expected.push_str("bg.bin").expect("fits");
            assert_eq!(surface(&w).source, BoundSource::Asset(expected));
        }

        static PLAY_END_CALLS: AtomicUsize = AtomicUsize::new(0);

        fn count_play_end(w: &mut Widget) {
            PLAY_END_CALLS.fetch_add(1, Ordering::SeqCst);
            assert_eq!(w.status(), Status::Stopped, "callback runs after pause");
        }

        #[test]
        fn test_loop_limit_stops_and_calls_back_once() {
            let mut w = widget(3);
            let callback: PlayEndCallback<_, _, _> = count_play_end;
            w.set_play_end_callback(Some(callback));
            w.set_loop_times(2);
            w.set_source("spin.bin").expect("open");
            w.resume().expect("resume");

            let mut outcomes = Vec::new();
            for _ in 0..6 {
                outcomes.push(tick(&mut w));
                if w.timer().is_armed() {
                    fire(&mut w);
                }
            }
            assert_eq!(outcomes.last(), Some(&PaintOutcome::Finished));
            assert_eq!(
                outcomes.iter().filter(|o| **o == PaintOutcome::Finished).count(),
                1
            );
            assert_eq!(PLAY_END_CALLS.load(Ordering::SeqCst), 1);
            assert_eq!(w.status(), Status::Stopped);
            assert!(!w.is_open());
            assert_eq!(tick(&mut w), PaintOutcome::Idle);
        }

        #[test]
        fn test_loop_times_zero_plays_once() {
            let mut w = widget(2);
            w.set_loop_times(0);
            assert_eq!(w.loop_limit(), LoopLimit::Times(1));
            w.set_source("spin.bin").expect("open");
            w.resume().expect("resume");
            assert_eq!(tick(&mut w), PaintOutcome::Advanced);
            fire(&mut w);
            assert_eq!(tick(&mut w), PaintOutcome::Finished);
        }

        #[test]
        fn test_forever_never_finishes() {
            let mut w = widget(3);
            w.set_loop_times(-1);
            w.set_source("spin.bin").expect("open");
            w.resume().expect("resume");
            for _ in 0..60 {
                assert_eq!(tick(&mut w), PaintOutcome::Advanced);
                fire(&mut w);
            }
            assert_eq!(w.status(), Status::AdvancePending);
        }

        fn select_next(w: &mut Widget) {
            w.select_by_index(1).expect("select from callback");
        }

        #[test]
        fn test_play_end_callback_may_select() {
            let mut w = widget(1);
            let callback: PlayEndCallback<_, _, _> = select_next;
            w.set_play_end_callback(Some(callback));
            w.set_select_prefix("anim_", "bg_", 4).expect("template");
            w.set_loop_times(1);
            w.select_by_index(0).expect("select");
            assert_eq!(tick(&mut w), PaintOutcome::Finished);
            assert_eq!(w.source(), Some("anim_01.bin"));
            assert_eq!(w.status(), Status::AdvancePending);
        }

        #[test]
        fn test_delay_suppresses_until_fifth_tick() {
            let mut w = widget(3);
            w.set_interval(100);
            w.set_source("spin.bin").expect("open");
            w.set_surface("bg.bin").expect("surface");
            w.resume_with_delay(500).expect("resume");

            for n in 1..=4 {
                assert_eq!(tick(&mut w), PaintOutcome::DelaySuppressed, "tick {n}");
                assert_eq!(surface(&w).frame_pushes, 0, "tick {n}");
                assert!(w.timer().is_armed(), "suppressed tick re-arms");
                fire(&mut w);
            }
            assert_eq!(tick(&mut w), PaintOutcome::DelayElapsed);
            assert_eq!(surface(&w).frame_pushes, 1);
            assert!(matches!(
                surface(&w).source,
                BoundSource::Frame { first_byte: Some(0), .. }
            ));
            assert_eq!(tick(&mut w), PaintOutcome::Advanced);
        }

        #[test]
        fn test_pause_cancels_delay() {
            let mut w = widget(3);
            w.set_interval(100);
            w.set_source("spin.bin").expect("open");
            w.resume_with_delay(500).expect("resume");
            assert_eq!(tick(&mut w), PaintOutcome::DelaySuppressed);
            w.pause();
            assert!(!w.timer().is_armed());
            w.resume().expect("resume");
            assert_eq!(tick(&mut w), PaintOutcome::Advanced);
        }

        #[test]
        fn test_select_by_index_resolves_both_names() {
            let mut w = widget(3);
            w.set_select_prefix("anim_", "bg_", 10).expect("template");
            w.select_by_index(3).expect("select");
            assert_eq!(w.source(), Some("anim_03.bin"));
            assert_eq!(w.surface_source(), Some("bg_03.bin"));
            assert_eq!(w.decoder().last_opened.as_str(), "anim_03.bin");
            assert_eq!(w.status(), Status::AdvancePending);

            assert_eq!(
                w.select_by_index(10),
                Err(PlaybackError::Path(PathError::IndexOutOfRange { index: 10, max: 10 }))
            );
            assert_eq!(w.source(), Some("anim_03.bin"));
            assert_eq!(w.surface_source(), Some("bg_03.bin"));
            assert_eq!(w.status(), Status::AdvancePending);
            assert_eq!(w.decoder().opens, 1);
        }

        #[test]
        fn test_select_without_prefix() {
            let mut w = widget(3);
            assert_eq!(w.select_by_index(0), Err(PlaybackError::NoSelectPrefix));
        }

        #[test]
        fn test_select_failed_open_leaves_stopped() {
            let mut decoder = ScriptedDecoder::new(3);
            decoder.fail_open_prefix = Some("anim_07");
            let mut w = widget_with(decoder);
            w.set_select_prefix("anim_", "bg_", 10).expect("template");
            w.select_by_index(2).expect("select");
            assert_eq!(
                w.select_by_index(7),
                Err(PlaybackError::Open(DecodeError::NotFound))
            );
            assert_eq!(w.status(), Status::Stopped);
            assert!(!w.is_open());
            assert!(!w.timer().is_armed());
        }

        #[test]
        fn test_select_without_surface_room_keeps_previous_source() {
            let mut w = widget(3);
            w.set_source("spin.bin").expect("open");
            w.set_select_prefix("anim_", "bg_", 10).expect("template");
            w.compositor_mut().fail_creation(true);

            assert_eq!(
                w.select_by_index(4),
                Err(PlaybackError::Compositor(CompositorError::OutOfElements))
            );
            assert_eq!(w.source(), Some("spin.bin"));
            assert_eq!(w.surface_source(), None);
            assert_eq!(w.surface_element(), None);
            assert_eq!(w.decoder().opens, 1);
            assert_eq!(w.status(), Status::Stopped);

            w.compositor_mut().fail_creation(false);
            w.select_by_index(4).expect("select");
            assert_eq!(w.source(), Some("anim_04.bin"));
            assert_eq!(w.surface_source(), Some("bg_04.bin"));
        }

        #[test]
        fn test_decode_failure_pauses() {
            let mut decoder = ScriptedDecoder::new(3);
            decoder.fail_decode_on = Some(2);
            let mut w = widget_with(decoder);
            w.set_source("spin.bin").expect("open");
            w.resume().expect("resume");
            assert_eq!(tick(&mut w), PaintOutcome::Advanced);
            fire(&mut w);
            assert_eq!(
                w.on_paint_tick(clip()),
                Err(PlaybackError::Decode(DecodeError::InvalidData))
            );
            assert_eq!(w.status(), Status::Stopped);
            assert!(!w.is_open());
        }

        #[test]
        fn test_zoom_resizes_widget() {
            let mut w = widget(3);
            w.set_source("spin.bin").expect("open");
            w.set_surface("bg.bin").expect("surface");
            w.set_zoom(512);
            assert_eq!(surface(&w).zoom.get(), 512);
            assert_eq!(container(&w).size, Size::new(5, 5));
            assert!(matches!(surface(&w).source, BoundSource::Frame { .. }));

            w.set_zoom(0);
            assert_eq!(w.zoom(), Zoom::NONE);
            assert_eq!(container(&w).size, Size::new(3, 3));
        }

        #[test]
        fn test_unit_zoom_still_adds_guard_pixel() {
            let mut w = widget(3);
            w.set_source("spin.bin").expect("open");
            assert_eq!(container(&w).size, Size::new(2, 2));

            w.set_zoom(256);
            assert_eq!(container(&w).size, Size::new(3, 3));
            assert_eq!(w.area().size, Size::new(3, 3));

            // A reopen keeps the zoomed size.
            w.pause();
            w.resume().expect("resume");
            assert_eq!(container(&w).size, Size::new(3, 3));
        }

        #[test]
        fn test_opacity_clamps() {
            let mut w = widget(3);
            w.set_surface("bg.bin").expect("surface");
            w.set_opacity(300);
            assert_eq!(w.opacity(), Opacity::COVER);
            assert_eq!(surface(&w).opacity, Opacity::COVER);
            w.set_opacity(128);
            assert_eq!(surface(&w).opacity.get(), 128);
        }

        #[test]
        fn test_set_source_while_open_defers_reopen() {
            let mut w = widget(3);
            w.set_source("a.bin").expect("open");
            w.resume().expect("resume");
            w.set_source("b.bin").expect("record");
            assert_eq!(w.status(), Status::Stopped);
            assert!(!w.timer().is_armed());
            assert_eq!(w.decoder().opens, 1);
            w.resume().expect("resume");
            assert_eq!(w.decoder().opens, 2);
            assert_eq!(w.decoder().closes, 1);
            assert_eq!(w.decoder().last_opened.as_str(), "b.bin");
        }

        #[test]
        fn test_zero_denominator_interval() {
            let mut decoder = ScriptedDecoder::new(3);
            decoder.timing = FrameTiming {
                delay_num: 50,
                delay_den: 0,
            };
            let mut w = widget_with(decoder);
            w.set_source("spin.bin").expect("open");
            w.resume().expect("resume");
            assert_eq!(w.timer().duration_ms(), 500);
        }

        #[test]
        fn test_interval_override() {
            let mut w = widget(3);
            w.set_interval(33);
            w.set_source("spin.bin").expect("open");
            w.resume().expect("resume");
            assert_eq!(w.timer().duration_ms(), 33);
        }

        #[test]
        fn test_cover_check_always_covers() {
            let w = widget(3);
            assert!(w.cover_check(clip()));
        }

        #[test]
        fn test_destroy_releases_everything() {
            let mut compositor = MockCompositor::new();
            let mut w = AnimatedImage::create(
                MockCompositor::SCREEN,
                ScriptedDecoder::new(3),
                MockTimer::new(),
                &mut compositor,
            )
            .expect("create");
            w.set_source("spin.bin").expect("open");
            w.set_surface("bg.bin").expect("surface");
            w.resume().expect("resume");
            w.destroy();
            assert_eq!(compositor.element_count(), 0);
        }

        #[test]
        fn test_create_failure_is_reported() {
            let mut compositor = MockCompositor::new();
            compositor.fail_creation(true);
            let result = AnimatedImage::create(
                MockCompositor::SCREEN,
                ScriptedDecoder::new(3),
                MockTimer::new(),
                compositor,
            );
            assert!(matches!(result, Err(PlaybackError::Compositor(_))));
        }
    }
}
