//! Surface compositor abstraction.
//!
//! The compositor owns a tree of visual elements. An animated-image widget is
//! a container element with one child image element (the *surface*) onto
//! which decoded frames are blended. The compositor paints; the playback
//! controller only rebinds sources and requests repaints.

use embedded_graphics::geometry::Size;
use thiserror_no_std::Error;

use crate::image::ImageDescriptor;

/// Opaque handle to a compositor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ElementId(pub u32);

/// What an image element displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// A static image asset, referenced by name.
    Asset(&'a str),
    /// A live frame buffer produced by a decoder handle.
    Frame {
        /// Geometry and payload size of `pixels`.
        descriptor: &'a ImageDescriptor,
        /// Pixel payload, owned by the decoder handle.
        pixels: &'a [u8],
    },
}

/// Image scale factor, in 1/256 units (256 = no scaling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Zoom(u16);

impl Zoom {
    /// Scaling unit: the image is drawn at its native size.
    pub const NONE: Self = Self(256);

    /// Create a zoom factor. Zero would collapse the image and is coerced to
    /// [`Zoom::NONE`].
    #[must_use]
    pub fn new(factor: u16) -> Self {
        if factor == 0 {
            Self::NONE
        } else {
            Self(factor)
        }
    }

    /// Raw factor in 1/256 units.
    #[must_use]
    pub fn get(self) -> u16 {
        self.0
    }

    /// Scale a source dimension: `⌈dimension × zoom / 256⌉ + 1`.
    ///
    /// The extra pixel keeps the scaled bounding box from ever being smaller
    /// than the rendered image. Saturates at `u16::MAX`.
    #[must_use]
    pub fn scale_dimension(self, dimension: u16) -> u16 {
        let unit = u32::from(Self::NONE.0);
        let scaled = u32::from(dimension)
            .saturating_mul(u32::from(self.0))
            .div_ceil(unit)
            .saturating_add(1);
        u16::try_from(scaled).unwrap_or(u16::MAX)
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::NONE
    }
}

/// Image opacity, 0 (transparent) to 255 (opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Opacity(u8);

impl Opacity {
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self(0);
    /// Fully opaque.
    pub const COVER: Self = Self(255);

    /// Create an opacity from a byte.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Create an opacity from a wider value, clamping above 255.
    #[must_use]
    pub fn from_u16(value: u16) -> Self {
        Self(u8::try_from(value).unwrap_or(u8::MAX))
    }

    /// Raw opacity byte.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

/// Errors returned by [`Compositor`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompositorError {
    /// The element pool is exhausted.
    #[error("compositor element pool exhausted")]
    OutOfElements,
    /// The parent element does not exist.
    #[error("parent element does not exist")]
    UnknownParent,
}

/// Surface compositor: element tree, image sources, and repaint requests.
///
/// All methods are synchronous and run on the render task. Operations on an
/// unknown element are ignored by implementations.
pub trait Compositor {
    /// Create a plain container element under `parent`.
    fn create_container(&mut self, parent: ElementId) -> Result<ElementId, CompositorError>;

    /// Create an image element under `parent`.
    fn create_image(&mut self, parent: ElementId) -> Result<ElementId, CompositorError>;

    /// Delete an element and all of its children.
    fn delete(&mut self, element: ElementId);

    /// Bind what an image element displays.
    fn set_image_source(&mut self, element: ElementId, source: ImageSource<'_>);

    /// Set the scale factor of an image element.
    fn set_zoom(&mut self, element: ElementId, zoom: Zoom);

    /// Set the opacity of an image element.
    fn set_opacity(&mut self, element: ElementId, opacity: Opacity);

    /// Resize an element.
    fn set_size(&mut self, element: ElementId, size: Size);

    /// Center `element` in its parent.
    fn align_center(&mut self, element: ElementId);

    /// Raise `element` above its siblings.
    fn bring_to_front(&mut self, element: ElementId);

    /// Request a repaint of `element` on the next render pass.
    fn invalidate(&mut self, element: ElementId);
}

impl<C: Compositor + ?Sized> Compositor for &mut C {
    fn create_container(&mut self, parent: ElementId) -> Result<ElementId, CompositorError> {
        (**self).create_container(parent)
    }

    fn create_image(&mut self, parent: ElementId) -> Result<ElementId, CompositorError> {
        (**self).create_image(parent)
    }

    fn delete(&mut self, element: ElementId) {
        (**self).delete(element);
    }

    fn set_image_source(&mut self, element: ElementId, source: ImageSource<'_>) {
        (**self).set_image_source(element, source);
    }

    fn set_zoom(&mut self, element: ElementId, zoom: Zoom) {
        (**self).set_zoom(element, zoom);
    }

    fn set_opacity(&mut self, element: ElementId, opacity: Opacity) {
        (**self).set_opacity(element, opacity);
    }

    fn set_size(&mut self, element: ElementId, size: Size) {
        (**self).set_size(element, size);
    }

    fn align_center(&mut self, element: ElementId) {
        (**self).align_center(element);
    }

    fn bring_to_front(&mut self, element: ElementId) {
        (**self).bring_to_front(element);
    }

    fn invalidate(&mut self, element: ElementId) {
        (**self).invalidate(element);
    }
}
