//! The animated-image widget.
//!
//! [`AnimatedImage`] owns one decoder handle, one frame timer and one
//! compositor element tree (a container plus an optional *surface* image)
//! and drives them from the host's render task:
//!
//! ```text
//! loop {
//!     widget.poll_timer();                 // timer expiry → AdvancePending + invalidate
//!     if repaint_requested {
//!         widget.on_paint_tick(clip)?;     // decode / composite / re-arm
//!     }
//! }
//! ```
//!
//! Every call runs on the render task; nothing blocks and nothing is shared
//! between widgets.

use embedded_graphics::geometry::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use platform::config::{DEFAULT_OUTPUT_FORMAT, MAX_ASSET_NAME_LEN};
use platform::{
    Compositor, ElementId, FrameTimer, ImageDescriptor, ImageSource, Opacity, OutputFormat, Zoom,
};

use crate::asset_path::{AssetName, PathError, SelectPrefix};
use crate::decoder::{AnimationDecoder, DecodeError, DecoderHandle, FrameTiming};
use crate::engine::{AfterFrame, PlaybackEngine, Status, TickPlan};
use crate::error::PlaybackError;
use crate::timing::{frame_interval_ms, LoopLimit};

/// Called once when a bounded loop sequence finishes, after the widget has
/// been paused. The widget may be reconfigured from inside the callback.
pub type PlayEndCallback<D, T, C> = fn(&mut AnimatedImage<D, T, C>);

/// What one paint tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PaintOutcome {
    /// Stopped: nothing drawn.
    Idle,
    /// Inside a delay budget: no frame shown, timer re-armed.
    DelaySuppressed,
    /// Delay budget met: the held frame was pushed to the surface.
    DelayElapsed,
    /// The current frame was redrawn.
    Redrawn,
    /// The next frame was decoded and shown; timer re-armed.
    Advanced,
    /// The last pass completed: the widget paused itself.
    Finished,
}

fn owned_name(asset: &str) -> Result<AssetName, PlaybackError> {
    let mut name = AssetName::new();
    name.push_str(asset).map_err(|_| {
        PlaybackError::Path(PathError::NameTooLong {
            capacity: MAX_ASSET_NAME_LEN,
        })
    })?;
    Ok(name)
}

/// Animated frame-sequence image with an optional surface image.
pub struct AnimatedImage<D: AnimationDecoder, T: FrameTimer, C: Compositor> {
    decoder: D,
    handle: Option<D::Handle>,
    /// The open handle belongs to an older source and is replaced on resume.
    stale_handle: bool,
    timer: T,
    compositor: C,
    engine: PlaybackEngine,
    element: ElementId,
    surface: Option<ElementId>,
    surface_shows_frame: bool,
    area: Rectangle,
    descriptor: Option<ImageDescriptor>,
    format: OutputFormat,
    source: Option<AssetName>,
    surface_source: Option<AssetName>,
    interval_override: Option<u32>,
    zoom: Zoom,
    /// `set_zoom` was called: sizes follow the zoom formula from then on.
    zoom_set: bool,
    opacity: Opacity,
    select: Option<SelectPrefix>,
    on_play_end: Option<PlayEndCallback<D, T, C>>,
}

impl<D: AnimationDecoder, T: FrameTimer, C: Compositor> AnimatedImage<D, T, C> {
    /// Create a stopped widget as a child of `parent`.
    ///
    /// Decoder output uses [`DEFAULT_OUTPUT_FORMAT`].
    pub fn create(
        parent: ElementId,
        decoder: D,
        timer: T,
        compositor: C,
    ) -> Result<Self, PlaybackError> {
        Self::create_with_format(parent, decoder, timer, compositor, DEFAULT_OUTPUT_FORMAT)
    }

    /// Create a stopped widget whose decoder output uses `format`.
    pub fn create_with_format(
        parent: ElementId,
        decoder: D,
        timer: T,
        mut compositor: C,
        format: OutputFormat,
    ) -> Result<Self, PlaybackError> {
        let element = compositor.create_container(parent)?;
        debug!("animated image {} created", element.0);
        Ok(Self {
            decoder,
            handle: None,
            stale_handle: false,
            timer,
            compositor,
            engine: PlaybackEngine::new(),
            element,
            surface: None,
            surface_shows_frame: false,
            area: Rectangle::new(Point::zero(), Size::zero()),
            descriptor: None,
            format,
            source: None,
            surface_source: None,
            interval_override: None,
            zoom: Zoom::NONE,
            zoom_set: false,
            opacity: Opacity::COVER,
            select: None,
            on_play_end: None,
        })
    }

    /// Pause and delete the widget's elements. Same as dropping it.
    pub fn destroy(self) {
        drop(self);
    }

    // ── Configuration ───────────────────────────────────────────────────────

    /// Configure the frame-sequence asset.
    ///
    /// Without an open decoder the asset is opened immediately, the widget
    /// is resized to the frame size and the frame descriptor is prepared.
    /// With a decoder already open only the name is recorded; the decoder is
    /// replaced on the next [`resume`](Self::resume). Either way playback is
    /// left `Stopped`.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::Open`] if the asset cannot be opened; the previous
    /// source is kept and the widget stays `Stopped`.
    pub fn set_source(&mut self, asset: &str) -> Result<(), PlaybackError> {
        let name = owned_name(asset)?;
        if self.handle.is_some() {
            if self.source.as_deref() != Some(asset) {
                self.stale_handle = true;
            }
        } else {
            self.open(asset)?;
        }
        self.source = Some(name);
        self.timer.cancel();
        self.engine.stop();
        Ok(())
    }

    /// Configure the surface image, creating the surface element on first
    /// use. The surface is centred in the widget and raised above siblings.
    pub fn set_surface(&mut self, asset: &str) -> Result<(), PlaybackError> {
        let name = owned_name(asset)?;
        let surface = self.surface_or_create()?;
        self.compositor.set_image_source(surface, ImageSource::Asset(asset));
        self.compositor.align_center(surface);
        self.compositor.bring_to_front(surface);
        self.surface_shows_frame = false;
        self.surface_source = Some(name);
        Ok(())
    }

    /// Scale the surface by `zoom / 256`. `0` means no scaling.
    ///
    /// The surface switches to the live frame, and the widget is resized to
    /// `⌈d × zoom / 256⌉ + 1` per dimension, the unit zoom included.
    pub fn set_zoom(&mut self, zoom: u16) {
        self.zoom = Zoom::new(zoom);
        self.zoom_set = true;
        if let Some(surface) = self.surface {
            self.bind_frame();
            self.compositor.set_zoom(surface, self.zoom);
        }
        self.apply_size();
    }

    /// Set the surface opacity (clamped to 255). The surface switches to the
    /// live frame.
    pub fn set_opacity(&mut self, opacity: u16) {
        self.opacity = Opacity::from_u16(opacity);
        if let Some(surface) = self.surface {
            self.bind_frame();
            self.compositor.set_opacity(surface, self.opacity);
        }
    }

    /// Fixed frame interval in milliseconds. `0` restores decoder timing.
    ///
    /// Takes effect from the next timer re-arm.
    pub fn set_interval(&mut self, interval_ms: u32) {
        self.interval_override = (interval_ms > 0).then_some(interval_ms);
    }

    /// Number of passes before playback stops on its own; negative repeats
    /// forever, `0` plays once. A running pass count is kept.
    pub fn set_loop_times(&mut self, times: i32) {
        self.engine.set_loop_limit(LoopLimit::from_times(times));
    }

    /// Install (or clear) the play-end callback.
    pub fn set_play_end_callback(&mut self, callback: Option<PlayEndCallback<D, T, C>>) {
        self.on_play_end = callback;
    }

    /// Configure indexed selection: `<frame_prefix>NN.bin` paired with
    /// `<surface_prefix>NN.bin` for `NN < max_index`.
    pub fn set_select_prefix(
        &mut self,
        frame_prefix: &str,
        surface_prefix: &str,
        max_index: u8,
    ) -> Result<(), PlaybackError> {
        self.select = Some(SelectPrefix::new(frame_prefix, surface_prefix, max_index)?);
        Ok(())
    }

    /// Move the widget's on-screen area to `top_left`.
    pub fn set_position(&mut self, top_left: Point) {
        self.area.top_left = top_left;
    }

    // ── Playback control ────────────────────────────────────────────────────

    /// Start or continue playback.
    ///
    /// Opens the configured source if no decoder is open. From `Stopped` the
    /// frame timer is armed and the first frame is requested right away. The
    /// surface, if any, switches to the live frame.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::NoSource`] before any source was configured,
    /// [`PlaybackError::Open`] if the source cannot be opened.
    pub fn resume(&mut self) -> Result<(), PlaybackError> {
        self.ensure_open()?;
        self.start();
        if self.surface.is_some() {
            self.bind_frame();
        }
        Ok(())
    }

    /// Like [`resume`](Self::resume), but keep the surface on its static
    /// image until `delay_ms` of frame periods have elapsed, then show the
    /// first frame once and continue normally. `0` is a plain `resume`.
    pub fn resume_with_delay(&mut self, delay_ms: u32) -> Result<(), PlaybackError> {
        if delay_ms == 0 {
            return self.resume();
        }
        self.ensure_open()?;
        self.engine.set_delay(delay_ms);
        self.start();
        debug!("delayed start: {} ms", delay_ms);
        Ok(())
    }

    /// Stop playback and release the decoder.
    ///
    /// The surface returns to its static image, the timer is cancelled and
    /// the loop counter and delay budget are reset. Safe from any state.
    pub fn pause(&mut self) {
        if let (Some(surface), Some(original)) = (self.surface, self.surface_source.as_deref()) {
            self.compositor
                .set_image_source(surface, ImageSource::Asset(original));
        }
        self.surface_shows_frame = false;
        self.timer.cancel();
        if let Some(handle) = self.handle.take() {
            self.decoder.close(handle);
            trace!("decoder closed");
        }
        self.stale_handle = false;
        self.engine.stop();
    }

    /// Switch to variant `index` of the configured name family: pause, load
    /// `<frame_prefix>NN.bin` with surface `<surface_prefix>NN.bin`, resume.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::NoSelectPrefix`] or [`PlaybackError::Path`] without
    /// touching the widget; [`PlaybackError::Compositor`] if the surface
    /// element cannot be created, before the source changes;
    /// [`PlaybackError::Open`] if the new asset fails to open, leaving the
    /// widget `Stopped`.
    pub fn select_by_index(&mut self, index: u8) -> Result<(), PlaybackError> {
        let select = self.select.as_mut().ok_or(PlaybackError::NoSelectPrefix)?;
        let (frame, surface) = select.resolve(index)?;
        let frame = owned_name(frame)?;
        let surface = owned_name(surface)?;
        info!("select variant {}: {}", index, frame.as_str());

        self.pause();
        self.surface_or_create()?;
        self.set_source(&frame)?;
        self.set_surface(&surface)?;
        self.resume()
    }

    // ── Host hooks ──────────────────────────────────────────────────────────

    /// The frame timer fired: request the next frame and a repaint.
    pub fn on_timer_fired(&mut self) {
        if self.engine.timer_fired() {
            self.compositor.invalidate(self.element);
        }
    }

    /// Poll the frame timer from the render loop; returns `true` if it fired.
    pub fn poll_timer(&mut self) -> bool {
        if self.timer.poll_expired() {
            self.on_timer_fired();
            true
        } else {
            false
        }
    }

    /// Paint the widget for the region `clip`.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::Decode`] if the decoder fails; the widget is paused
    /// before returning.
    pub fn on_paint_tick(&mut self, clip: Rectangle) -> Result<PaintOutcome, PlaybackError> {
        match self.engine.begin_tick(self.timer.duration_ms()) {
            TickPlan::Idle => Ok(PaintOutcome::Idle),
            TickPlan::DelaySuppressed => {
                self.timer.arm(self.next_interval_ms());
                Ok(PaintOutcome::DelaySuppressed)
            }
            TickPlan::DelayElapsed => {
                self.bind_frame();
                self.compositor.invalidate(self.element);
                Ok(PaintOutcome::DelayElapsed)
            }
            TickPlan::Draw { advance } => self.draw(clip, advance),
        }
    }

    /// Whether the widget fully covers `area` when painted. Frames are
    /// always composited over the whole widget, so it always does.
    pub fn cover_check(&self, _area: Rectangle) -> bool {
        true
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    /// Current playback status.
    pub fn status(&self) -> Status {
        self.engine.status()
    }

    /// Completed passes under a bounded loop limit, `None` when not counting.
    pub fn loops_completed(&self) -> Option<u32> {
        self.engine.loops_completed()
    }

    /// Configured loop limit.
    pub fn loop_limit(&self) -> LoopLimit {
        self.engine.loop_limit()
    }

    /// Configured frame-sequence asset.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Configured surface asset.
    pub fn surface_source(&self) -> Option<&str> {
        self.surface_source.as_deref()
    }

    /// Descriptor of the frame buffer, once an asset has been opened.
    pub fn descriptor(&self) -> Option<&ImageDescriptor> {
        self.descriptor.as_ref()
    }

    /// Pixels of the frame currently held by the decoder.
    pub fn frame(&self) -> Option<&[u8]> {
        self.handle.as_ref().map(|handle| handle.output())
    }

    /// `true` while a decoder handle is open.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// The widget's container element.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// The surface image element, once created.
    pub fn surface_element(&self) -> Option<ElementId> {
        self.surface
    }

    /// The widget's on-screen area.
    pub fn area(&self) -> Rectangle {
        self.area
    }

    /// Current zoom.
    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    /// Current opacity.
    pub fn opacity(&self) -> Opacity {
        self.opacity
    }

    /// The decoder (opener).
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// The frame timer.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// The frame timer, mutably (host-driven timers).
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// The compositor.
    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    /// The compositor, mutably.
    pub fn compositor_mut(&mut self) -> &mut C {
        &mut self.compositor
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn surface_or_create(&mut self) -> Result<ElementId, PlaybackError> {
        if let Some(surface) = self.surface {
            return Ok(surface);
        }
        let surface = self.compositor.create_image(self.element)?;
        self.compositor.set_zoom(surface, self.zoom);
        self.compositor.set_opacity(surface, self.opacity);
        self.surface = Some(surface);
        Ok(surface)
    }

    fn open(&mut self, asset: &str) -> Result<(), PlaybackError> {
        let handle = self.decoder.open(asset, self.format).map_err(|e| {
            warn!("cannot open {}: {}", asset, e);
            PlaybackError::Open(e)
        })?;
        let header = handle.header();
        let Some(descriptor) =
            ImageDescriptor::for_frame(header.width, header.height, handle.pixel_size())
        else {
            self.decoder.close(handle);
            return Err(PlaybackError::Open(DecodeError::InvalidData));
        };
        info!(
            "opened {}: {}x{}, {} frames",
            asset, header.width, header.height, header.frame_count
        );
        self.descriptor = Some(descriptor);
        self.handle = Some(handle);
        self.apply_size();
        Ok(())
    }

    fn ensure_open(&mut self) -> Result<(), PlaybackError> {
        if self.stale_handle {
            if let Some(handle) = self.handle.take() {
                self.decoder.close(handle);
            }
            self.stale_handle = false;
        }
        if self.handle.is_none() {
            let source = self.source.clone().ok_or(PlaybackError::NoSource)?;
            self.open(&source)?;
        }
        Ok(())
    }

    fn start(&mut self) {
        if self.engine.start() {
            self.timer.arm(self.next_interval_ms());
            self.compositor.invalidate(self.element);
        }
    }

    fn next_interval_ms(&self) -> u32 {
        let timing = self.handle.as_ref().map_or(
            FrameTiming {
                delay_num: 0,
                delay_den: 0,
            },
            |handle| handle.next_frame_timing(),
        );
        frame_interval_ms(self.interval_override, timing)
    }

    /// Point the surface at the live frame buffer.
    fn bind_frame(&mut self) {
        let (Some(surface), Some(descriptor), Some(handle)) =
            (self.surface, self.descriptor.as_ref(), self.handle.as_ref())
        else {
            return;
        };
        let output = handle.output();
        let pixels = output.get(..descriptor.data_size).unwrap_or(output);
        self.compositor.set_image_source(
            surface,
            ImageSource::Frame {
                descriptor,
                pixels,
            },
        );
        self.surface_shows_frame = true;
    }

    fn apply_size(&mut self) {
        let Some(descriptor) = self.descriptor else {
            return;
        };
        let (w, h) = (descriptor.header.width, descriptor.header.height);
        let (w, h) = if self.zoom_set {
            (self.zoom.scale_dimension(w), self.zoom.scale_dimension(h))
        } else {
            (w, h)
        };
        let size = Size::new(u32::from(w), u32::from(h));
        self.area.size = size;
        self.compositor.set_size(self.element, size);
    }

    fn draw(&mut self, clip: Rectangle, advance: bool) -> Result<PaintOutcome, PlaybackError> {
        let area = self.area;
        let Some(handle) = self.handle.as_mut() else {
            // Not reachable while the engine is running; treat as stopped.
            self.engine.stop();
            return Ok(PaintOutcome::Idle);
        };
        if let Err(e) = handle.decode(area, clip, advance) {
            warn!("decode failed: {}", e);
            self.pause();
            return Err(PlaybackError::Decode(e));
        }
        let completed_pass = handle.at_last_frame();
        trace!("frame {} drawn", handle.current_frame());
        if self.surface_shows_frame {
            self.bind_frame();
        }

        match self.engine.frame_drawn(advance, completed_pass) {
            AfterFrame::Finished => {
                info!("play end after {} passes", self.engine.loops_completed().unwrap_or(0));
                self.pause();
                if let Some(callback) = self.on_play_end {
                    callback(self);
                }
                Ok(PaintOutcome::Finished)
            }
            AfterFrame::Rearm => {
                self.timer.arm(self.next_interval_ms());
                Ok(PaintOutcome::Advanced)
            }
            AfterFrame::Hold => Ok(PaintOutcome::Redrawn),
        }
    }
}

impl<D: AnimationDecoder, T: FrameTimer, C: Compositor> Drop for AnimatedImage<D, T, C> {
    fn drop(&mut self) {
        self.pause();
        self.compositor.delete(self.element);
        debug!("animated image {} destroyed", self.element.0);
    }
}
