//! Image descriptors handed to the compositor.
//!
//! A decoded animation frame is described by an [`ImageDescriptor`] (geometry,
//! colour format, payload size) and a pixel slice owned by the decoder handle.
//! The descriptor outlives individual frames: it is prepared once when an
//! asset is opened and reused for every frame the handle produces.

/// Pixel layout of an image as seen by the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorFormat {
    /// Native display colour, no alpha channel.
    TrueColor,
    /// Native display colour followed by an 8-bit alpha byte.
    TrueColorAlpha,
}

/// Output layout requested from a frame decoder.
///
/// Both layouts carry a trailing alpha byte per pixel so the compositor can
/// blend frames over the surface image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputFormat {
    /// 16-bit RGB565 + 8-bit alpha (3 bytes per pixel).
    Rgb565,
    /// 24-bit RGB888 + 8-bit alpha (4 bytes per pixel).
    Rgb888,
}

impl OutputFormat {
    /// Bytes per pixel including the alpha byte.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb565 => 3,
            Self::Rgb888 => 4,
        }
    }

    /// Decode the on-flash format tag (0 = RGB565, 1 = RGB888).
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Rgb565),
            1 => Some(Self::Rgb888),
            _ => None,
        }
    }

    /// On-flash format tag, inverse of [`OutputFormat::from_tag`].
    pub const fn tag(self) -> u8 {
        match self {
            Self::Rgb565 => 0,
            Self::Rgb888 => 1,
        }
    }
}

/// Geometry and colour format of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImageHeader {
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Pixel layout.
    pub format: ColorFormat,
}

/// Descriptor of an in-memory image: header plus payload size in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImageDescriptor {
    /// Image geometry and format.
    pub header: ImageHeader,
    /// Payload size: `pixel_size × width × height`.
    pub data_size: usize,
}

impl ImageDescriptor {
    /// Build a `TrueColorAlpha` descriptor for a decoded frame.
    ///
    /// Returns `None` if `pixel_size × width × height` overflows `usize`.
    pub fn for_frame(width: u16, height: u16, pixel_size: usize) -> Option<Self> {
        let data_size = pixel_size
            .checked_mul(usize::from(width))?
            .checked_mul(usize::from(height))?;
        Some(Self {
            header: ImageHeader {
                width,
                height,
                format: ColorFormat::TrueColorAlpha,
            },
            data_size,
        })
    }
}
