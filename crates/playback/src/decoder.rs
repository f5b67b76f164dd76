//! Frame-sequence decoder abstractions: headers, frame timing, handle traits.
//!
//! The decoder is a stateful service: [`AnimationDecoder::open`] yields a
//! handle that owns one output pixel buffer, and every
//! [`DecoderHandle::decode`] call either advances to the next frame or
//! re-renders the current one into that buffer.  Bit-level decompression is
//! the implementor's business; the controller only sees headers, timing and
//! the finished buffer.
//!
//! Handles must be `no_std`-safe and must not allocate: the output buffer is
//! sized once, when the asset is opened.

use embedded_graphics::primitives::Rectangle;
use platform::config::DEFAULT_DELAY_DENOMINATOR;
use platform::OutputFormat;
use thiserror_no_std::Error;

/// Stream-level header of an opened frame sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnimationHeader {
    /// Frame width in pixels.
    pub width: u16,
    /// Frame height in pixels.
    pub height: u16,
    /// Number of frames in one full pass.
    pub frame_count: u16,
}

/// Display duration of a frame as the fraction `delay_num / delay_den` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameTiming {
    /// Delay numerator.
    pub delay_num: u16,
    /// Delay denominator; 0 is read as [`DEFAULT_DELAY_DENOMINATOR`].
    pub delay_den: u16,
}

impl FrameTiming {
    /// Frame interval in milliseconds: `delay_num × 1000 / delay_den`.
    ///
    /// A zero denominator is normalised to 100 instead of faulting, so the
    /// numerator is then read as hundredths of a second.
    #[must_use]
    pub fn interval_ms(self) -> u32 {
        let den = if self.delay_den == 0 {
            DEFAULT_DELAY_DENOMINATOR
        } else {
            self.delay_den
        };
        // u16::MAX × 1000 fits in u32; den is non-zero.
        u32::from(self.delay_num)
            .saturating_mul(1000)
            .checked_div(u32::from(den))
            .unwrap_or(0)
    }
}

/// Errors that an [`AnimationDecoder`] or [`DecoderHandle`] may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// The asset does not exist.
    #[error("asset not found")]
    NotFound,
    /// The asset is malformed or truncated.
    #[error("malformed frame-sequence data")]
    InvalidData,
    /// The asset's pixel format does not match the requested output.
    #[error("unsupported pixel format")]
    UnsupportedFormat,
    /// One decoded frame does not fit in the handle's output buffer.
    #[error("frame does not fit output buffer")]
    BufferTooSmall,
    /// The backing store failed while reading.
    #[error("asset storage read failed")]
    Storage,
}

/// Opener for frame-sequence assets.
pub trait AnimationDecoder {
    /// Handle type produced by [`open`](AnimationDecoder::open).
    type Handle: DecoderHandle;

    /// Open `asset`, decoding into `format`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] for missing or malformed assets.
    fn open(&mut self, asset: &str, format: OutputFormat) -> Result<Self::Handle, DecodeError>;

    /// Release a handle and everything it owns.
    fn close(&mut self, handle: Self::Handle) {
        drop(handle);
    }
}

/// An open frame sequence.
pub trait DecoderHandle {
    /// Stream header.
    fn header(&self) -> AnimationHeader;

    /// Bytes per output pixel, alpha included.
    fn pixel_size(&self) -> usize;

    /// Sequence number of the frame currently held in the output buffer
    /// (0 before the first decode).
    fn current_frame(&self) -> u16;

    /// Timing of the frame the next advancing decode will produce.
    fn next_frame_timing(&self) -> FrameTiming;

    /// Render into the output buffer.
    ///
    /// With `advance = true` the next frame is decoded (wrapping to frame 0
    /// after the last one); with `advance = false` the current frame is
    /// re-rendered. `target` is the widget's on-screen area and `clip` the
    /// region actually being repainted.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] on bitstream or storage failures.
    fn decode(&mut self, target: Rectangle, clip: Rectangle, advance: bool)
        -> Result<(), DecodeError>;

    /// Output pixel buffer, owned by the handle.
    fn output(&self) -> &[u8];

    /// `true` if the frame in the output buffer is the last of a pass.
    fn at_last_frame(&self) -> bool {
        u32::from(self.current_frame()).saturating_add(1) == u32::from(self.header().frame_count)
    }
}
