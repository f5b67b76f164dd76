//! Errors reported by the animated-image controller.

use platform::CompositorError;
use thiserror_no_std::Error;

use crate::asset_path::PathError;
use crate::decoder::DecodeError;

/// Errors returned by [`AnimatedImage`](crate::widget::AnimatedImage)
/// operations.
///
/// Contract errors (`NoSelectPrefix`, `Path`) are raised before any state is
/// touched. Asset errors (`Open`, `Decode`) leave the widget `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackError {
    /// `resume` was called before any source was configured.
    #[error("no source configured")]
    NoSource,
    /// The decoder could not open the configured asset.
    #[error("failed to open asset: {0}")]
    Open(DecodeError),
    /// The decoder failed while producing a frame.
    #[error("failed to decode frame: {0}")]
    Decode(DecodeError),
    /// `select_by_index` was called without a naming template.
    #[error("no select prefix configured")]
    NoSelectPrefix,
    /// An asset name could not be built or stored.
    #[error("invalid asset name: {0}")]
    Path(PathError),
    /// The compositor could not create an element.
    #[error("compositor: {0}")]
    Compositor(CompositorError),
}

impl From<PathError> for PlaybackError {
    fn from(e: PathError) -> Self {
        Self::Path(e)
    }
}

impl From<CompositorError> for PlaybackError {
    fn from(e: CompositorError) -> Self {
        Self::Compositor(e)
    }
}
