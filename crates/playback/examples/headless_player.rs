//! Plays a generated frame sequence on the desktop without a display.
//!
//! The compositor only logs what it is asked to do; the frame timer is the
//! real `EmbassyFrameTimer` on embassy-time's std driver.
//!
//! ```text
//! RUST_LOG=debug cargo run -p playback --example headless_player --features tracing
//! ```

#![allow(clippy::print_stdout)]
#![allow(clippy::arithmetic_side_effects)]

use std::cell::Cell;
use std::time::Duration;

use embedded_graphics::geometry::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use platform::mocks::MemoryAssetStore;
use platform::{
    Compositor, CompositorError, EmbassyFrameTimer, ElementId, ImageSource, Opacity, OutputFormat,
    Zoom,
};
use playback::raw_sequence::{encode_sequence, encoded_len};
use playback::{
    AnimatedImage, FrameTiming, PaintOutcome, PlayEndCallback, PlaybackError, RawSequenceDecoder,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const WIDTH: u16 = 8;
const HEIGHT: u16 = 8;
const FRAMES: u8 = 6;
const FRAME_LEN: usize = WIDTH as usize * HEIGHT as usize * 3;

type Player<'s, 'a, 'c> = AnimatedImage<
    RawSequenceDecoder<&'s MemoryAssetStore<'a, 2>, FRAME_LEN>,
    EmbassyFrameTimer,
    &'c mut ConsoleCompositor,
>;

/// Compositor that logs every call and remembers pending repaints.
#[derive(Default)]
struct ConsoleCompositor {
    next_id: u32,
    repaint: Cell<bool>,
}

impl ConsoleCompositor {
    fn take_repaint(&self) -> bool {
        self.repaint.replace(false)
    }

    fn allocate(&mut self) -> ElementId {
        self.next_id = self.next_id.saturating_add(1);
        ElementId(self.next_id)
    }
}

impl Compositor for ConsoleCompositor {
    fn create_container(&mut self, parent: ElementId) -> Result<ElementId, CompositorError> {
        let id = self.allocate();
        info!(parent = parent.0, id = id.0, "create container");
        Ok(id)
    }

    fn create_image(&mut self, parent: ElementId) -> Result<ElementId, CompositorError> {
        let id = self.allocate();
        info!(parent = parent.0, id = id.0, "create image");
        Ok(id)
    }

    fn delete(&mut self, element: ElementId) {
        info!(id = element.0, "delete");
    }

    fn set_image_source(&mut self, element: ElementId, source: ImageSource<'_>) {
        match source {
            ImageSource::Asset(name) => info!(id = element.0, name, "show asset"),
            ImageSource::Frame { pixels, .. } => {
                info!(id = element.0, frame = ?pixels.first(), "show frame");
            }
        }
    }

    fn set_zoom(&mut self, element: ElementId, zoom: Zoom) {
        info!(id = element.0, zoom = zoom.get(), "zoom");
    }

    fn set_opacity(&mut self, element: ElementId, opacity: Opacity) {
        info!(id = element.0, opacity = opacity.get(), "opacity");
    }

    fn set_size(&mut self, element: ElementId, size: Size) {
        info!(id = element.0, width = size.width, height = size.height, "resize");
    }

    fn align_center(&mut self, element: ElementId) {
        info!(id = element.0, "align center");
    }

    fn bring_to_front(&mut self, element: ElementId) {
        info!(id = element.0, "bring to front");
    }

    fn invalidate(&mut self, _element: ElementId) {
        self.repaint.set(true);
    }
}

fn build_asset() -> Vec<u8> {
    let frames: Vec<[u8; FRAME_LEN]> = (0..FRAMES).map(|i| [i; FRAME_LEN]).collect();
    let timing = FrameTiming {
        delay_num: 1,
        delay_den: 20,
    };
    let table: Vec<(FrameTiming, &[u8])> = frames.iter().map(|f| (timing, &f[..])).collect();
    let len = encoded_len(WIDTH, HEIGHT, OutputFormat::Rgb565, u16::from(FRAMES)).unwrap_or(0);
    let mut buf = vec![0u8; len];
    let written = encode_sequence(&mut buf, WIDTH, HEIGHT, OutputFormat::Rgb565, &table)
        .unwrap_or(0);
    buf.truncate(written);
    buf
}

fn on_play_end(player: &mut Player<'_, '_, '_>) {
    info!(status = ?player.status(), "play end");
}

fn main() -> Result<(), PlaybackError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("{} v{}", platform::config::APP_NAME, platform::config::APP_VERSION);

    let asset = build_asset();
    let mut store: MemoryAssetStore<'_, 2> = MemoryAssetStore::new();
    if store.insert("spinner_00.bin", &asset).is_err() {
        return Ok(());
    }

    let mut compositor = ConsoleCompositor::default();
    let mut widget = AnimatedImage::create(
        ElementId(0),
        RawSequenceDecoder::<_, FRAME_LEN>::new(&store),
        EmbassyFrameTimer::new(),
        &mut compositor,
    )?;
    widget.set_select_prefix("spinner_", "spinner_bg_", 1)?;
    widget.set_loop_times(2);
    let callback: PlayEndCallback<_, _, _> = on_play_end;
    widget.set_play_end_callback(Some(callback));
    widget.select_by_index(0)?;

    let clip = Rectangle::new(Point::zero(), Size::new(u32::from(WIDTH), u32::from(HEIGHT)));
    loop {
        widget.poll_timer();
        if widget.compositor().take_repaint() {
            let outcome = widget.on_paint_tick(clip)?;
            info!(?outcome, "paint");
            if outcome == PaintOutcome::Finished {
                break;
            }
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    widget.destroy();
    println!("done");
    Ok(())
}
