//! xtask make-asset: write a synthetic RFSQ frame sequence.
//!
//! Each frame is a vertical bar sweeping left to right over a dark
//! background, so playback order is obvious on screen.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use platform::OutputFormat;
use playback::raw_sequence::{encode_sequence, encoded_len};
use playback::FrameTiming;

use crate::Format;

const BAR: [u8; 3] = [0xFF, 0xFF, 0xFF];
const BACKGROUND: [u8; 3] = [0x10, 0x10, 0x20];

/// Shape of the generated sequence.
pub struct AssetParams {
    pub width: u16,
    pub height: u16,
    pub frames: u16,
    pub delay_ms: u16,
    pub format: Format,
}

impl AssetParams {
    fn output_format(&self) -> OutputFormat {
        match self.format {
            Format::Rgb565 => OutputFormat::Rgb565,
            Format::Rgb888 => OutputFormat::Rgb888,
        }
    }

    fn timing(&self) -> FrameTiming {
        FrameTiming {
            delay_num: self.delay_ms,
            delay_den: 1000,
        }
    }
}

/// Entry point called from main.rs
pub fn run(out: &Path, params: &AssetParams) -> Result<()> {
    let bytes = build(params)?;
    std::fs::write(out, &bytes).with_context(|| format!("writing {}", out.display()))?;
    println!(
        "{}",
        format!(
            "✓ Wrote {} frames of {}x{} ({} bytes) to {}",
            params.frames,
            params.width,
            params.height,
            bytes.len(),
            out.display()
        )
        .green()
    );
    Ok(())
}

/// Encode the whole container in memory.
pub(crate) fn build(params: &AssetParams) -> Result<Vec<u8>> {
    if params.frames == 0 || params.width == 0 || params.height == 0 {
        anyhow::bail!("width, height and frames must all be non-zero");
    }
    let format = params.output_format();
    let len = encoded_len(params.width, params.height, format, params.frames)
        .context("asset size overflows")?;

    let pixels: Vec<Vec<u8>> = (0..params.frames)
        .map(|i| render_frame(params, format, i))
        .collect();
    let timing = params.timing();
    let table: Vec<(FrameTiming, &[u8])> = pixels.iter().map(|p| (timing, p.as_slice())).collect();

    let mut buf = vec![0u8; len];
    let written = encode_sequence(&mut buf, params.width, params.height, format, &table)
        .map_err(|e| anyhow::anyhow!("encoding failed: {e}"))?;
    buf.truncate(written);
    Ok(buf)
}

#[allow(clippy::arithmetic_side_effects)]
fn render_frame(params: &AssetParams, format: OutputFormat, index: u16) -> Vec<u8> {
    let width = usize::from(params.width);
    let bar_width = (width / 4).max(1);
    let bar_start = usize::from(index) * width / usize::from(params.frames);
    let bpp = format.bytes_per_pixel();

    let mut frame = Vec::with_capacity(width * usize::from(params.height) * bpp);
    for _ in 0..params.height {
        for x in 0..width {
            let on_bar = (x + width - bar_start) % width < bar_width;
            let rgb = if on_bar { BAR } else { BACKGROUND };
            push_pixel(&mut frame, format, rgb);
        }
    }
    frame
}

fn push_pixel(frame: &mut Vec<u8>, format: OutputFormat, [r, g, b]: [u8; 3]) {
    match format {
        OutputFormat::Rgb565 => {
            let packed = (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3);
            frame.extend_from_slice(&packed.to_le_bytes());
        }
        OutputFormat::Rgb888 => frame.extend_from_slice(&[r, g, b]),
    }
    frame.push(0xFF);
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use embedded_graphics::geometry::{Point, Size};
    use embedded_graphics::primitives::Rectangle;
    use platform::mocks::MemoryAssetStore;
    use playback::{AnimationDecoder, DecoderHandle, RawSequenceDecoder};
    use tempfile::TempDir;

    fn params(format: Format) -> AssetParams {
        AssetParams {
            width: 8,
            height: 2,
            frames: 4,
            delay_ms: 40,
            format,
        }
    }

    #[test]
    fn built_asset_has_expected_length() {
        let p = params(Format::Rgb565);
        let bytes = build(&p).unwrap();
        assert_eq!(
            Some(bytes.len()),
            encoded_len(8, 2, OutputFormat::Rgb565, 4)
        );
    }

    #[test]
    fn zero_frames_is_rejected() {
        let mut p = params(Format::Rgb565);
        p.frames = 0;
        assert!(build(&p).is_err());
    }

    #[test]
    fn bar_moves_between_frames() {
        let p = params(Format::Rgb888);
        let first = render_frame(&p, OutputFormat::Rgb888, 0);
        let second = render_frame(&p, OutputFormat::Rgb888, 1);
        assert_eq!(first.len(), 8 * 2 * 4);
        assert_ne!(first, second);
        assert_eq!(&first[..4], &[0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn written_asset_decodes_with_raw_sequence_decoder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sweep.bin");
        run(&path, &params(Format::Rgb565)).unwrap();
        let bytes = std::fs::read(&path).unwrap();

        let mut store: MemoryAssetStore<'_, 1> = MemoryAssetStore::new();
        store.insert("sweep.bin", &bytes).unwrap();
        let mut decoder = RawSequenceDecoder::<_, { 8 * 2 * 3 }>::new(&store);
        let mut handle = decoder.open("sweep.bin", OutputFormat::Rgb565).unwrap();
        assert_eq!(handle.header().frame_count, 4);
        assert_eq!(handle.next_frame_timing().interval_ms(), 40);

        let area = Rectangle::new(Point::zero(), Size::new(8, 2));
        handle.decode(area, area, true).unwrap();
        assert_eq!(handle.output().len(), 8 * 2 * 3);
        decoder.close(handle);
    }
}
