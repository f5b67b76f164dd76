//! Scripted decoder for controller tests.
//!
//! Produces `frame_count` synthetic frames whose first pixel byte is the
//! frame's sequence number, counts opens/closes/decodes, and can be told to
//! fail on open or on a given decode call.

use embedded_graphics::primitives::Rectangle;
use heapless::String;
use platform::OutputFormat;

use crate::decoder::{AnimationDecoder, AnimationHeader, DecodeError, DecoderHandle, FrameTiming};

const BUF_LEN: usize = 64;

#[derive(Debug)]
pub struct ScriptedDecoder {
    pub header: AnimationHeader,
    pub timing: FrameTiming,
    /// Assets whose name starts with this prefix fail to open.
    pub fail_open_prefix: Option<&'static str>,
    /// Fail the n-th decode call (1-based) of every handle.
    pub fail_decode_on: Option<u32>,
    pub opens: usize,
    pub closes: usize,
    pub last_opened: String<64>,
}

impl ScriptedDecoder {
    pub fn new(frame_count: u16) -> Self {
        Self {
            header: AnimationHeader {
                width: 2,
                height: 2,
                frame_count,
            },
            timing: FrameTiming {
                delay_num: 1,
                delay_den: 10,
            },
            fail_open_prefix: None,
            fail_decode_on: None,
            opens: 0,
            closes: 0,
            last_opened: String::new(),
        }
    }

    pub fn live_handles(&self) -> usize {
        self.opens.saturating_sub(self.closes)
    }
}

impl AnimationDecoder for ScriptedDecoder {
    type Handle = ScriptedHandle;

    fn open(&mut self, asset: &str, format: OutputFormat) -> Result<ScriptedHandle, DecodeError> {
        if self.fail_open_prefix.is_some_and(|p| asset.starts_with(p)) {
            return Err(DecodeError::NotFound);
        }
        self.opens = self.opens.saturating_add(1);
        self.last_opened.clear();
        self.last_opened
            .push_str(asset)
            .map_err(|_| DecodeError::NotFound)?;
        Ok(ScriptedHandle {
            header: self.header,
            timing: self.timing,
            pixel_size: format.bytes_per_pixel(),
            current: None,
            decodes: 0,
            fail_decode_on: self.fail_decode_on,
            buf: [0; BUF_LEN],
        })
    }

    fn close(&mut self, handle: ScriptedHandle) {
        self.closes = self.closes.saturating_add(1);
        drop(handle);
    }
}

#[derive(Debug)]
pub struct ScriptedHandle {
    header: AnimationHeader,
    timing: FrameTiming,
    pixel_size: usize,
    current: Option<u16>,
    decodes: u32,
    fail_decode_on: Option<u32>,
    buf: [u8; BUF_LEN],
}

impl DecoderHandle for ScriptedHandle {
    fn header(&self) -> AnimationHeader {
        self.header
    }

    fn pixel_size(&self) -> usize {
        self.pixel_size
    }

    fn current_frame(&self) -> u16 {
        self.current.unwrap_or(0)
    }

    fn next_frame_timing(&self) -> FrameTiming {
        self.timing
    }

    fn decode(&mut self, _target: Rectangle, _clip: Rectangle, advance: bool) -> Result<(), DecodeError> {
        self.decodes = self.decodes.saturating_add(1);
        if self.fail_decode_on == Some(self.decodes) {
            return Err(DecodeError::InvalidData);
        }
        if advance {
            let next = match self.current {
                Some(n) if n.saturating_add(1) < self.header.frame_count => n.saturating_add(1),
                _ => 0,
            };
            self.current = Some(next);
            self.buf = [u8::try_from(next).unwrap_or(u8::MAX); BUF_LEN];
        }
        Ok(())
    }

    fn output(&self) -> &[u8] {
        &self.buf
    }
}
