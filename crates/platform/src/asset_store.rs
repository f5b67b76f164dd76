//! Read-only asset store abstraction
//!
//! Frame-sequence assets and surface images are stored as named files in
//! external NOR/NAND flash. On hardware the store is usually a thin wrapper
//! over the memory-mapped `XiP` window or a read-only file system; in tests a
//! mock implementation returns pre-loaded bytes.
//!
//! Asset names are the logical references produced by the playback
//! controller, e.g. `anim_03.bin` for the fourth variant of a numbered family:
//!
//! ```text
//! /anim/
//!   anim_00.bin   bg_00.bin
//!   anim_01.bin   bg_01.bin
//!   ...           ...
//!   anim_NN.bin   bg_NN.bin     NN < 100 (two-digit index)
//! ```

use thiserror_no_std::Error;

/// Errors returned by an [`AssetStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AssetError {
    /// No asset with that name exists.
    #[error("asset not found")]
    NotFound,
    /// The requested offset lies past the end of the asset.
    #[error("offset past end of asset")]
    OutOfBounds,
    /// The underlying flash read failed.
    #[error("flash read failed")]
    Io,
}

/// Read-only, name-keyed asset store.
pub trait AssetStore {
    /// Read up to `buf.len()` bytes of `name` into `buf`, starting at
    /// `offset` within the asset.
    ///
    /// Returns the number of bytes actually read (may be less than
    /// `buf.len()` if `offset + buf.len() > asset_size(name)`).
    fn read_asset(&self, name: &str, offset: usize, buf: &mut [u8]) -> Result<usize, AssetError>;

    /// Return the size in bytes of `name`, or `Err` if the asset is absent.
    fn asset_size(&self, name: &str) -> Result<usize, AssetError>;

    /// Return `true` if `name` is present in the store.
    fn asset_exists(&self, name: &str) -> bool {
        self.asset_size(name).is_ok()
    }

    /// Read exactly `buf.len()` bytes at `offset`.
    ///
    /// Returns [`AssetError::OutOfBounds`] on a short read.
    fn read_exact(&self, name: &str, offset: usize, buf: &mut [u8]) -> Result<(), AssetError> {
        let n = self.read_asset(name, offset, buf)?;
        if n == buf.len() {
            Ok(())
        } else {
            Err(AssetError::OutOfBounds)
        }
    }
}

impl<S: AssetStore + ?Sized> AssetStore for &S {
    fn read_asset(&self, name: &str, offset: usize, buf: &mut [u8]) -> Result<usize, AssetError> {
        (**self).read_asset(name, offset, buf)
    }

    fn asset_size(&self, name: &str) -> Result<usize, AssetError> {
        (**self).asset_size(name)
    }
}
