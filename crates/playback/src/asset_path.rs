//! Indexed asset names: `<prefix><NN><suffix>`.
//!
//! A family of numbered variants (`anim_00.bin`, `anim_01.bin`, …) paired with
//! matching surface images (`bg_00.bin`, …) is addressed by a two-digit index.
//! Names are written into fixed-capacity buffers owned by the widget, cleared
//! and reused on every selection.

use core::fmt::Write as _;

use heapless::String;
use platform::config::{FRAME_ASSET_SUFFIX, MAX_ASSET_NAME_LEN, MAX_SELECT_INDEX};
use thiserror_no_std::Error;

/// Owned asset name buffer.
pub type AssetName = String<MAX_ASSET_NAME_LEN>;

/// Digits in the zero-padded index.
const INDEX_DIGITS: usize = 2;

/// Errors produced while resolving an indexed asset name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PathError {
    /// The name prefix is empty.
    #[error("asset name prefix is empty")]
    EmptyPrefix,
    /// `index` is not below the configured bound.
    #[error("index {index} out of range (max {max})")]
    IndexOutOfRange {
        /// Requested index.
        index: u8,
        /// Exclusive bound.
        max: u8,
    },
    /// The resolved name does not fit the name buffer.
    #[error("asset name exceeds {capacity} bytes")]
    NameTooLong {
        /// Buffer capacity in bytes.
        capacity: usize,
    },
}

fn check(prefix: &str, index: u8, max_index: u8, suffix: &str) -> Result<(), PathError> {
    if prefix.is_empty() {
        return Err(PathError::EmptyPrefix);
    }
    if index >= max_index {
        return Err(PathError::IndexOutOfRange {
            index,
            max: max_index,
        });
    }
    let len = prefix
        .len()
        .saturating_add(INDEX_DIGITS)
        .saturating_add(suffix.len());
    if len > MAX_ASSET_NAME_LEN {
        return Err(PathError::NameTooLong {
            capacity: MAX_ASSET_NAME_LEN,
        });
    }
    Ok(())
}

/// Write `<prefix><index:02><suffix>` into `buf`.
///
/// All inputs are validated first; on error `buf` is left untouched.
pub fn resolve_into(
    buf: &mut AssetName,
    prefix: &str,
    index: u8,
    max_index: u8,
    suffix: &str,
) -> Result<(), PathError> {
    check(prefix, index, max_index, suffix)?;
    buf.clear();
    write!(buf, "{prefix}{index:02}{suffix}").map_err(|_| PathError::NameTooLong {
        capacity: MAX_ASSET_NAME_LEN,
    })
}

/// Naming template for indexed selection: frame prefix, surface prefix and
/// the exclusive index bound, plus the two reusable name buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectPrefix {
    frame_prefix: AssetName,
    surface_prefix: AssetName,
    max_index: u8,
    frame_name: AssetName,
    surface_name: AssetName,
}

impl SelectPrefix {
    /// Build a template. `max_index` is clamped to [`MAX_SELECT_INDEX`].
    pub fn new(frame_prefix: &str, surface_prefix: &str, max_index: u8) -> Result<Self, PathError> {
        if frame_prefix.is_empty() || surface_prefix.is_empty() {
            return Err(PathError::EmptyPrefix);
        }
        let too_long = PathError::NameTooLong {
            capacity: MAX_ASSET_NAME_LEN,
        };
        let mut frame = AssetName::new();
        frame.push_str(frame_prefix).map_err(|_| too_long)?;
        let mut surface = AssetName::new();
        surface.push_str(surface_prefix).map_err(|_| too_long)?;
        Ok(Self {
            frame_prefix: frame,
            surface_prefix: surface,
            max_index: max_index.min(MAX_SELECT_INDEX),
            frame_name: AssetName::new(),
            surface_name: AssetName::new(),
        })
    }

    /// Exclusive index bound.
    pub fn max_index(&self) -> u8 {
        self.max_index
    }

    /// Frame-sequence asset prefix.
    pub fn frame_prefix(&self) -> &str {
        &self.frame_prefix
    }

    /// Surface asset prefix.
    pub fn surface_prefix(&self) -> &str {
        &self.surface_prefix
    }

    /// Resolve both names for `index`, returning `(frame, surface)`.
    ///
    /// Both names are checked before either buffer is written.
    pub fn resolve(&mut self, index: u8) -> Result<(&str, &str), PathError> {
        check(&self.frame_prefix, index, self.max_index, FRAME_ASSET_SUFFIX)?;
        check(&self.surface_prefix, index, self.max_index, FRAME_ASSET_SUFFIX)?;
        resolve_into(
            &mut self.frame_name,
            &self.frame_prefix,
            index,
            self.max_index,
            FRAME_ASSET_SUFFIX,
        )?;
        resolve_into(
            &mut self.surface_name,
            &self.surface_prefix,
            index,
            self.max_index,
            FRAME_ASSET_SUFFIX,
        )?;
        Ok((&self.frame_name, &self.surface_name))
    }
}
