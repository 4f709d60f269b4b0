//! Storage format tags.
//!
//! # Types
//!
//! - [`RasterFormat`] - Interleaved RGBA / gray encodings held by a [`Raster`](crate::Raster)
//! - [`SubsampleRatio`] - Chroma subsampling of a planar [`YCbCr`](crate::YCbCr) image
//! - [`PixelFormat`] - Closed tag over every storage the accessor understands
//!
//! # Usage
//!
//! ```rust
//! use filtra_core::{PixelFormat, RasterFormat};
//!
//! let f = RasterFormat::PremulRgba16;
//! assert_eq!(f.bytes_per_pixel(), 8);
//! assert!(f.is_premultiplied());
//! assert_eq!(PixelFormat::Raster(f).channel_depth(), 16);
//! ```

use crate::rect::Rect;

/// Interleaved pixel encodings of a [`Raster`](crate::Raster).
///
/// 16-bit samples are stored big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RasterFormat {
    /// 8-bit RGBA, non-premultiplied.
    #[default]
    Rgba8,
    /// 16-bit RGBA, non-premultiplied.
    Rgba16,
    /// 8-bit RGBA, colour premultiplied by alpha.
    PremulRgba8,
    /// 16-bit RGBA, colour premultiplied by alpha.
    PremulRgba16,
    /// 8-bit luma, always opaque.
    Gray8,
    /// 16-bit luma, always opaque.
    Gray16,
}

impl RasterFormat {
    /// Bytes used by one pixel.
    #[inline]
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgba8 | Self::PremulRgba8 => 4,
            Self::Rgba16 | Self::PremulRgba16 => 8,
            Self::Gray8 => 1,
            Self::Gray16 => 2,
        }
    }

    /// Bits per channel sample.
    #[inline]
    pub const fn bits(&self) -> u32 {
        match self {
            Self::Rgba8 | Self::PremulRgba8 | Self::Gray8 => 8,
            Self::Rgba16 | Self::PremulRgba16 | Self::Gray16 => 16,
        }
    }

    /// Whether colour channels are stored multiplied by alpha.
    #[inline]
    pub const fn is_premultiplied(&self) -> bool {
        matches!(self, Self::PremulRgba8 | Self::PremulRgba16)
    }

    /// Whether the format carries a single luma channel.
    #[inline]
    pub const fn is_gray(&self) -> bool {
        matches!(self, Self::Gray8 | Self::Gray16)
    }
}

/// Chroma subsampling ratio of a planar luma/chroma image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubsampleRatio {
    /// Full resolution chroma.
    #[default]
    R444,
    /// Half horizontal chroma resolution.
    R422,
    /// Half horizontal and vertical chroma resolution.
    R420,
    /// Half vertical chroma resolution.
    R440,
    /// Quarter horizontal chroma resolution.
    R411,
    /// Quarter horizontal, half vertical chroma resolution.
    R410,
}

impl SubsampleRatio {
    /// Horizontal and vertical chroma divisors.
    #[inline]
    pub const fn factors(&self) -> (i32, i32) {
        match self {
            Self::R444 => (1, 1),
            Self::R422 => (2, 1),
            Self::R420 => (2, 2),
            Self::R440 => (1, 2),
            Self::R411 => (4, 1),
            Self::R410 => (4, 2),
        }
    }

    /// Width and height of a chroma plane covering `r`.
    pub fn chroma_size(&self, r: &Rect) -> (i32, i32) {
        let (sx, sy) = self.factors();
        let cw = if sx == 1 {
            r.width()
        } else {
            (r.max_x + sx - 1) / sx - r.min_x / sx
        };
        let ch = if sy == 1 {
            r.height()
        } else {
            (r.max_y + sy - 1) / sy - r.min_y / sy
        };
        (cw.max(0), ch.max(0))
    }
}

/// Closed tag over every storage the pixel accessor can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Interleaved RGBA or gray bytes.
    Raster(RasterFormat),
    /// Planar luma/chroma with the given subsampling.
    YCbCr(SubsampleRatio),
    /// 8-bit indices into an RGBA palette.
    Paletted,
    /// User storage reached through a colour callback.
    Generic,
}

impl PixelFormat {
    /// Native precision of one colour channel, in bits.
    ///
    /// 8 for 8-bit rasters and YCbCr, 16 otherwise (palettes and generic
    /// sources resolve to 16-bit colours).
    #[inline]
    pub const fn channel_depth(&self) -> u32 {
        match self {
            Self::Raster(f) => f.bits(),
            Self::YCbCr(_) => 8,
            Self::Paletted | Self::Generic => 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_format_sizes() {
        assert_eq!(RasterFormat::Rgba8.bytes_per_pixel(), 4);
        assert_eq!(RasterFormat::Rgba16.bytes_per_pixel(), 8);
        assert_eq!(RasterFormat::Gray8.bytes_per_pixel(), 1);
        assert_eq!(RasterFormat::Gray16.bytes_per_pixel(), 2);
        assert!(RasterFormat::Gray16.is_gray());
        assert!(!RasterFormat::Rgba16.is_premultiplied());
    }

    #[test]
    fn test_chroma_size() {
        let r = Rect::new(0, 0, 5, 3);
        assert_eq!(SubsampleRatio::R444.chroma_size(&r), (5, 3));
        assert_eq!(SubsampleRatio::R422.chroma_size(&r), (3, 3));
        assert_eq!(SubsampleRatio::R420.chroma_size(&r), (3, 2));
        assert_eq!(SubsampleRatio::R440.chroma_size(&r), (5, 2));
        assert_eq!(SubsampleRatio::R411.chroma_size(&r), (2, 3));
        assert_eq!(SubsampleRatio::R410.chroma_size(&r), (2, 2));
    }

    #[test]
    fn test_channel_depth() {
        assert_eq!(PixelFormat::Raster(RasterFormat::Gray8).channel_depth(), 8);
        assert_eq!(PixelFormat::YCbCr(SubsampleRatio::R420).channel_depth(), 8);
        assert_eq!(PixelFormat::Paletted.channel_depth(), 16);
        assert_eq!(PixelFormat::Generic.channel_depth(), 16);
    }
}
