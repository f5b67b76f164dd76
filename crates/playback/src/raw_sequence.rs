//! Uncompressed frame-sequence container ("RFSQ").
//!
//! The simplest asset the controller can play: a header, a timing table, and
//! pre-rendered frames already in the display's output layout.  It is what
//! the factory tooling emits for small looping icons, and what the host tests
//! play through the full controller.
//!
//! # Layout (little-endian)
//!
//! ```text
//! offset  size            field
//! 0       4               magic "RFSQ"
//! 4       2               width
//! 6       2               height
//! 8       2               frame_count (≥ 1)
//! 10      1               format tag (0 = RGB565+A, 1 = RGB888+A)
//! 11      1               reserved (0)
//! 12      4 × frame_count (delay_num u16, delay_den u16) per frame
//! ...     frame_len × frame_count   frames, frame_len = w × h × bpp
//! ```

use embedded_graphics::primitives::Rectangle;
use heapless::{String, Vec};
use platform::config::MAX_ASSET_NAME_LEN;
use platform::{AssetError, AssetStore, OutputFormat};

use crate::decoder::{AnimationDecoder, AnimationHeader, DecodeError, DecoderHandle, FrameTiming};

/// Container magic.
pub const MAGIC: [u8; 4] = *b"RFSQ";
/// Fixed header length in bytes.
pub const HEADER_LEN: usize = 12;
/// Bytes per timing-table entry.
pub const TIMING_ENTRY_LEN: usize = 4;

impl From<AssetError> for DecodeError {
    fn from(e: AssetError) -> Self {
        match e {
            AssetError::NotFound => DecodeError::NotFound,
            AssetError::OutOfBounds => DecodeError::InvalidData,
            AssetError::Io => DecodeError::Storage,
        }
    }
}

fn le_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let lo = *bytes.get(at)?;
    let hi = *bytes.get(at.checked_add(1)?)?;
    Some(u16::from_le_bytes([lo, hi]))
}

fn put_le_u16(buf: &mut [u8], at: usize, value: u16) -> Option<()> {
    buf.get_mut(at..at.checked_add(2)?)?
        .copy_from_slice(&value.to_le_bytes());
    Some(())
}

/// Byte offsets of one opened container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    frame_len: usize,
    frames_offset: usize,
}

impl Layout {
    fn new(header: AnimationHeader, format: OutputFormat) -> Option<Self> {
        let frame_len = usize::from(header.width)
            .checked_mul(usize::from(header.height))?
            .checked_mul(format.bytes_per_pixel())?;
        let frames_offset = usize::from(header.frame_count)
            .checked_mul(TIMING_ENTRY_LEN)?
            .checked_add(HEADER_LEN)?;
        Some(Self {
            frame_len,
            frames_offset,
        })
    }

    fn timing_offset(index: u16) -> usize {
        // index < frame_count ≤ u16::MAX, so this cannot overflow usize.
        HEADER_LEN.saturating_add(usize::from(index).saturating_mul(TIMING_ENTRY_LEN))
    }

    fn frame_offset(&self, index: u16) -> Option<usize> {
        self.frame_len
            .checked_mul(usize::from(index))?
            .checked_add(self.frames_offset)
    }

    fn total_len(&self, frame_count: u16) -> Option<usize> {
        self.frame_offset(frame_count)
    }
}

/// Total encoded size of a container, or `None` on overflow.
pub fn encoded_len(width: u16, height: u16, format: OutputFormat, frame_count: u16) -> Option<usize> {
    let header = AnimationHeader {
        width,
        height,
        frame_count,
    };
    Layout::new(header, format)?.total_len(frame_count)
}

/// Serialise a container into `buf`, returning the number of bytes written.
///
/// Every frame must be exactly `width × height × bytes_per_pixel` bytes.
///
/// # Errors
///
/// - [`DecodeError::InvalidData`] for an empty frame list, more than
///   `u16::MAX` frames, or a frame of the wrong length.
/// - [`DecodeError::BufferTooSmall`] if `buf` cannot hold the container.
pub fn encode_sequence(
    buf: &mut [u8],
    width: u16,
    height: u16,
    format: OutputFormat,
    frames: &[(FrameTiming, &[u8])],
) -> Result<usize, DecodeError> {
    let frame_count = u16::try_from(frames.len()).map_err(|_| DecodeError::InvalidData)?;
    if frame_count == 0 {
        return Err(DecodeError::InvalidData);
    }
    let header = AnimationHeader {
        width,
        height,
        frame_count,
    };
    let layout = Layout::new(header, format).ok_or(DecodeError::InvalidData)?;
    let total = layout
        .total_len(frame_count)
        .ok_or(DecodeError::InvalidData)?;
    let out = buf.get_mut(..total).ok_or(DecodeError::BufferTooSmall)?;

    out.get_mut(..4)
        .ok_or(DecodeError::BufferTooSmall)?
        .copy_from_slice(&MAGIC);
    put_le_u16(out, 4, width).ok_or(DecodeError::BufferTooSmall)?;
    put_le_u16(out, 6, height).ok_or(DecodeError::BufferTooSmall)?;
    put_le_u16(out, 8, frame_count).ok_or(DecodeError::BufferTooSmall)?;
    let tail = out.get_mut(10..12).ok_or(DecodeError::BufferTooSmall)?;
    tail.copy_from_slice(&[format.tag(), 0]);

    for (index, (timing, pixels)) in (0u16..).zip(frames.iter()) {
        if pixels.len() != layout.frame_len {
            return Err(DecodeError::InvalidData);
        }
        let at = Layout::timing_offset(index);
        put_le_u16(out, at, timing.delay_num).ok_or(DecodeError::BufferTooSmall)?;
        put_le_u16(out, at.saturating_add(2), timing.delay_den)
            .ok_or(DecodeError::BufferTooSmall)?;
        let start = layout.frame_offset(index).ok_or(DecodeError::InvalidData)?;
        let end = start
            .checked_add(layout.frame_len)
            .ok_or(DecodeError::InvalidData)?;
        out.get_mut(start..end)
            .ok_or(DecodeError::BufferTooSmall)?
            .copy_from_slice(pixels);
    }
    Ok(total)
}

/// Opens RFSQ containers from an [`AssetStore`].
///
/// `N` is the capacity of each handle's output buffer in bytes; assets whose
/// frames are larger fail to open with [`DecodeError::BufferTooSmall`].
#[derive(Debug, Clone)]
pub struct RawSequenceDecoder<S, const N: usize> {
    store: S,
}

impl<S: AssetStore + Clone, const N: usize> RawSequenceDecoder<S, N> {
    /// Create a decoder reading from `store` (typically a `&'static` store).
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: AssetStore + Clone, const N: usize> AnimationDecoder for RawSequenceDecoder<S, N> {
    type Handle = RawSequenceHandle<S, N>;

    fn open(&mut self, asset: &str, format: OutputFormat) -> Result<Self::Handle, DecodeError> {
        RawSequenceHandle::open(self.store.clone(), asset, format)
    }
}

/// An opened RFSQ container.
#[derive(Debug)]
pub struct RawSequenceHandle<S, const N: usize> {
    store: S,
    name: String<MAX_ASSET_NAME_LEN>,
    header: AnimationHeader,
    format: OutputFormat,
    layout: Layout,
    current: Option<u16>,
    loaded: Option<u16>,
    next_timing: FrameTiming,
    output: Vec<u8, N>,
}

impl<S: AssetStore, const N: usize> RawSequenceHandle<S, N> {
    fn open(store: S, asset: &str, format: OutputFormat) -> Result<Self, DecodeError> {
        let mut name = String::new();
        name.push_str(asset).map_err(|_| DecodeError::NotFound)?;

        let mut raw = [0u8; HEADER_LEN];
        store.read_exact(asset, 0, &mut raw)?;
        if raw.get(..4) != Some(MAGIC.as_slice()) {
            return Err(DecodeError::InvalidData);
        }
        let field = |at| le_u16(&raw, at).ok_or(DecodeError::InvalidData);
        let header = AnimationHeader {
            width: field(4)?,
            height: field(6)?,
            frame_count: field(8)?,
        };
        if header.frame_count == 0 {
            return Err(DecodeError::InvalidData);
        }
        let tag = raw.get(10).copied().ok_or(DecodeError::InvalidData)?;
        let stored = OutputFormat::from_tag(tag).ok_or(DecodeError::InvalidData)?;
        if stored != format {
            return Err(DecodeError::UnsupportedFormat);
        }

        let layout = Layout::new(header, format).ok_or(DecodeError::InvalidData)?;
        let total = layout
            .total_len(header.frame_count)
            .ok_or(DecodeError::InvalidData)?;
        if store.asset_size(asset)? < total {
            return Err(DecodeError::InvalidData);
        }
        if layout.frame_len > N {
            return Err(DecodeError::BufferTooSmall);
        }

        let mut handle = Self {
            store,
            name,
            header,
            format,
            layout,
            current: None,
            loaded: None,
            next_timing: FrameTiming {
                delay_num: 0,
                delay_den: 0,
            },
            output: Vec::new(),
        };
        handle
            .output
            .resize(layout.frame_len, 0)
            .map_err(|_| DecodeError::BufferTooSmall)?;
        // Hold frame 0 so a delayed start has something to show.
        handle.load_frame(0)?;
        handle.next_timing = handle.read_timing(0)?;
        Ok(handle)
    }

    /// Output layout of this handle.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn read_timing(&self, index: u16) -> Result<FrameTiming, DecodeError> {
        let mut entry = [0u8; TIMING_ENTRY_LEN];
        self.store
            .read_exact(&self.name, Layout::timing_offset(index), &mut entry)?;
        Ok(FrameTiming {
            delay_num: le_u16(&entry, 0).ok_or(DecodeError::InvalidData)?,
            delay_den: le_u16(&entry, 2).ok_or(DecodeError::InvalidData)?,
        })
    }

    fn load_frame(&mut self, index: u16) -> Result<(), DecodeError> {
        if self.loaded == Some(index) {
            return Ok(());
        }
        let offset = self
            .layout
            .frame_offset(index)
            .ok_or(DecodeError::InvalidData)?;
        self.store.read_exact(&self.name, offset, &mut self.output)?;
        self.loaded = Some(index);
        Ok(())
    }

    fn following(&self, index: u16) -> u16 {
        let next = index.wrapping_add(1);
        if next >= self.header.frame_count {
            0
        } else {
            next
        }
    }
}

impl<S: AssetStore, const N: usize> DecoderHandle for RawSequenceHandle<S, N> {
    fn header(&self) -> AnimationHeader {
        self.header
    }

    fn pixel_size(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    fn current_frame(&self) -> u16 {
        self.current.unwrap_or(0)
    }

    fn next_frame_timing(&self) -> FrameTiming {
        self.next_timing
    }

    fn decode(&mut self, _target: Rectangle, _clip: Rectangle, advance: bool) -> Result<(), DecodeError> {
        // Frames are stored pre-rendered at full size, so the whole frame is
        // always produced regardless of the clip.
        let index = match (advance, self.current) {
            (true, Some(current)) => self.following(current),
            (true, None) => 0,
            (false, current) => current.unwrap_or(0),
        };
        self.load_frame(index)?;
        if advance {
            self.current = Some(index);
            self.next_timing = self.read_timing(self.following(index))?;
        }
        Ok(())
    }

    fn output(&self) -> &[u8] {
        &self.output
    }
}
