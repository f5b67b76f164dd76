//! Application configuration and constants
//!
//! This module defines central configuration values used across the
//! animated-image stack. Widget code should reference these constants rather
//! than hardcoding values.

use crate::image::OutputFormat;

/// The application name
pub const APP_NAME: &str = "FrameSeq";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File suffix appended to every resolved frame-sequence / surface asset name.
pub const FRAME_ASSET_SUFFIX: &str = ".bin";

/// Capacity, in bytes, of every stored asset name.
///
/// Names longer than this are rejected rather than truncated.
pub const MAX_ASSET_NAME_LEN: usize = 64;

/// Exclusive upper bound for indexed asset selection.
///
/// Resolved names carry a two-digit index, so at most 100 variants
/// (`00`..=`99`) can be addressed.
pub const MAX_SELECT_INDEX: u8 = 100;

/// Denominator assumed when a decoder reports a zero frame-delay denominator.
///
/// With this default the delay numerator is read as hundredths of a second.
pub const DEFAULT_DELAY_DENOMINATOR: u16 = 100;

/// Loop-count sentinel meaning "repeat forever".
pub const LOOP_FOREVER: i32 = -1;

/// Decoder output layout matching a 16-bit display pipeline.
pub const DEFAULT_OUTPUT_FORMAT: OutputFormat = OutputFormat::Rgb565;
