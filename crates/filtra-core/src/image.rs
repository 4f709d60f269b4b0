//! Pixel storages and the source/target capability traits.
//!
//! Engines never touch concrete storages. They see a [`Source`] (bounds,
//! a [`Reader`], an opacity query) and a [`Target`] (bounds, a [`Writer`]).
//! The concrete storages in this module implement those traits:
//!
//! - [`Raster`] - Interleaved RGBA or gray bytes, readable and writable
//! - [`RasterViewMut`] - Writable sub-rectangle of a raster
//! - [`Paletted`] - 8-bit indices into an RGBA palette
//! - [`YCbCr`] - Planar luma/chroma with chroma subsampling, read-only
//! - [`Generic`] - Any user type implementing [`ColorSource`] / [`ColorSink`]
//!
//! # Memory Layout
//!
//! Rasters store pixels row-major, top to bottom, with `stride` bytes per
//! row. Byte 0 is pixel `(bounds.min_x, bounds.min_y)`:
//!
//! ```text
//! Rgba8:  [R G B A R G B A ...]            <- row min_y
//! Rgba16: [Rh Rl Gh Gl Bh Bl Ah Al ...]    <- big-endian samples
//! ```
//!
//! # Usage
//!
//! ```rust
//! use filtra_core::{Pixel, Raster, RasterFormat, Rect, Source};
//!
//! let mut img = Raster::new(RasterFormat::Rgba8, Rect::new(-2, -2, 2, 2));
//! img.set(-2, -2, Pixel::new(1.0, 0.0, 0.0, 1.0));
//! assert_eq!(img.pix()[..4], [255, 0, 0, 255]);
//! assert_eq!(img.get(-2, -2), Pixel::new(1.0, 0.0, 0.0, 1.0));
//! assert!(!img.is_opaque());
//! ```

use crate::accessor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::format::{RasterFormat, SubsampleRatio};
use crate::pixel::Pixel;
use crate::rect::Rect;

// ============================================================================
// Capability traits
// ============================================================================

/// Read side of an image.
pub trait Source: Sync {
    /// Pixel rectangle covered by the image.
    fn bounds(&self) -> Rect;

    /// Builds the format-resolved pixel reader.
    fn reader(&self) -> Reader<'_>;

    /// True when every pixel is known to be fully opaque.
    ///
    /// Filters may skip alpha work for opaque sources. Custom sources
    /// default to `false`.
    fn is_opaque(&self) -> bool {
        false
    }
}

/// Write side of an image.
pub trait Target: Send {
    /// Pixel rectangle covered by the image.
    fn bounds(&self) -> Rect;

    /// Builds the format-resolved pixel writer.
    fn writer(&mut self) -> Writer<'_>;

    /// A writable view of `rect` sharing this image's storage.
    ///
    /// Storages that cannot address a sub-region cheaply return `None`.
    fn sub_target(&mut self, _rect: Rect) -> Option<Box<dyn Target + '_>> {
        None
    }
}

/// Colour callback for custom image types.
///
/// Colours are 16-bit **non-premultiplied** `[r, g, b, a]`.
pub trait ColorSource: Sync {
    /// Pixel rectangle covered by the image.
    fn bounds(&self) -> Rect;

    /// Colour at `(x, y)`; only called for coordinates inside the bounds.
    fn color_at(&self, x: i32, y: i32) -> [u16; 4];
}

/// Writable colour callback for custom image types.
pub trait ColorSink: ColorSource + Send {
    /// Stores a 16-bit non-premultiplied colour at `(x, y)`.
    fn set_color(&mut self, x: i32, y: i32, color: [u16; 4]);
}

// ============================================================================
// Raster
// ============================================================================

/// Interleaved RGBA or gray pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub(crate) format: RasterFormat,
    pub(crate) bounds: Rect,
    pub(crate) stride: usize,
    pub(crate) pix: Vec<u8>,
}

impl Raster {
    /// Allocates a zeroed (transparent black) raster.
    pub fn new(format: RasterFormat, bounds: Rect) -> Self {
        let stride = bounds.width().max(0) as usize * format.bytes_per_pixel();
        let len = stride * bounds.height().max(0) as usize;
        Self {
            format,
            bounds,
            stride,
            pix: vec![0; len],
        }
    }

    /// Wraps an existing tightly packed buffer.
    ///
    /// # Errors
    ///
    /// [`Error::BufferSize`] when `pix` is not exactly
    /// `width * height * bytes_per_pixel` long.
    pub fn from_pix(format: RasterFormat, bounds: Rect, pix: Vec<u8>) -> Result<Self> {
        let stride = (bounds.width().max(0) as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or_else(|| Error::InvalidDimensions(format!("{bounds}")))?;
        let expected = stride
            .checked_mul(bounds.height().max(0) as usize)
            .ok_or_else(|| Error::InvalidDimensions(format!("{bounds}")))?;
        if pix.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: pix.len(),
            });
        }
        Ok(Self {
            format,
            bounds,
            stride,
            pix,
        })
    }

    /// Storage encoding.
    #[inline]
    pub fn format(&self) -> RasterFormat {
        self.format
    }

    /// Pixel rectangle.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw bytes.
    #[inline]
    pub fn pix(&self) -> &[u8] {
        &self.pix
    }

    /// Mutable raw bytes.
    #[inline]
    pub fn pix_mut(&mut self) -> &mut [u8] {
        &mut self.pix
    }

    /// Consumes the raster, returning its bytes.
    #[inline]
    pub fn into_pix(self) -> Vec<u8> {
        self.pix
    }

    /// Byte offset of pixel `(x, y)`, or `None` outside the bounds.
    #[inline]
    pub fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        Some(
            (y - self.bounds.min_y) as usize * self.stride
                + (x - self.bounds.min_x) as usize * self.format.bytes_per_pixel(),
        )
    }

    /// Canonical pixel at `(x, y)`; transparent outside the bounds.
    pub fn get(&self, x: i32, y: i32) -> Pixel {
        Reader::raster(self).pixel(x, y)
    }

    /// Stores a canonical pixel; ignored outside the bounds.
    pub fn set(&mut self, x: i32, y: i32, px: Pixel) {
        Writer::raster(self).set_pixel(x, y, px);
    }

    /// Writable view restricted to `rect` (clipped to the bounds).
    pub fn view_mut(&mut self, rect: Rect) -> RasterViewMut<'_> {
        let bounds = self.bounds.intersect(&rect);
        RasterViewMut {
            raster: self,
            bounds,
        }
    }

    /// Whether every alpha sample is at its maximum.
    pub fn is_opaque(&self) -> bool {
        let bpp = self.format.bytes_per_pixel();
        let width = self.bounds.width().max(0) as usize;
        match self.format {
            RasterFormat::Gray8 | RasterFormat::Gray16 => true,
            RasterFormat::Rgba8 | RasterFormat::PremulRgba8 => self
                .pix
                .chunks_exact(self.stride.max(1))
                .all(|row| row[..width * bpp].chunks_exact(bpp).all(|p| p[3] == 0xff)),
            RasterFormat::Rgba16 | RasterFormat::PremulRgba16 => self
                .pix
                .chunks_exact(self.stride.max(1))
                .all(|row| {
                    row[..width * bpp]
                        .chunks_exact(bpp)
                        .all(|p| p[6] == 0xff && p[7] == 0xff)
                }),
        }
    }
}

impl Source for Raster {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn reader(&self) -> Reader<'_> {
        Reader::raster(self)
    }

    fn is_opaque(&self) -> bool {
        Raster::is_opaque(self)
    }
}

impl Target for Raster {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn writer(&mut self) -> Writer<'_> {
        Writer::raster(self)
    }

    fn sub_target(&mut self, rect: Rect) -> Option<Box<dyn Target + '_>> {
        Some(Box::new(self.view_mut(rect)))
    }
}

/// Writable sub-rectangle of a [`Raster`].
///
/// Writes outside the view are dropped even when they fall inside the
/// parent raster.
#[derive(Debug)]
pub struct RasterViewMut<'a> {
    raster: &'a mut Raster,
    bounds: Rect,
}

impl Target for RasterViewMut<'_> {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn writer(&mut self) -> Writer<'_> {
        Writer::raster_view(self.raster, self.bounds)
    }

    fn sub_target(&mut self, rect: Rect) -> Option<Box<dyn Target + '_>> {
        let bounds = self.bounds.intersect(&rect);
        Some(Box::new(RasterViewMut {
            raster: &mut *self.raster,
            bounds,
        }))
    }
}

// ============================================================================
// Paletted
// ============================================================================

/// 8-bit indices into a palette of non-premultiplied RGBA8 colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paletted {
    pub(crate) bounds: Rect,
    pub(crate) stride: usize,
    pub(crate) pix: Vec<u8>,
    pub(crate) palette: Vec<[u8; 4]>,
}

impl Paletted {
    /// Allocates an image filled with index 0.
    ///
    /// # Errors
    ///
    /// [`Error::PaletteTooLarge`] for palettes longer than 256 entries.
    pub fn new(bounds: Rect, palette: Vec<[u8; 4]>) -> Result<Self> {
        let stride = bounds.width().max(0) as usize;
        let len = stride * bounds.height().max(0) as usize;
        Self::from_pix(bounds, vec![0; len], palette)
    }

    /// Wraps an existing index buffer.
    pub fn from_pix(bounds: Rect, pix: Vec<u8>, palette: Vec<[u8; 4]>) -> Result<Self> {
        if palette.len() > 256 {
            return Err(Error::PaletteTooLarge(palette.len()));
        }
        let stride = bounds.width().max(0) as usize;
        let expected = stride * bounds.height().max(0) as usize;
        if pix.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: pix.len(),
            });
        }
        Ok(Self {
            bounds,
            stride,
            pix,
            palette,
        })
    }

    /// Pixel rectangle.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Palette entries.
    #[inline]
    pub fn palette(&self) -> &[[u8; 4]] {
        &self.palette
    }

    /// Index bytes, one per pixel.
    #[inline]
    pub fn pix(&self) -> &[u8] {
        &self.pix
    }

    /// Mutable index bytes.
    #[inline]
    pub fn pix_mut(&mut self) -> &mut [u8] {
        &mut self.pix
    }

    /// Palette index at `(x, y)`.
    pub fn index_at(&self, x: i32, y: i32) -> Option<u8> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let i = (y - self.bounds.min_y) as usize * self.stride + (x - self.bounds.min_x) as usize;
        self.pix.get(i).copied()
    }

    /// Whether every palette entry referenced by a pixel is opaque.
    pub fn is_opaque(&self) -> bool {
        let mut present = [false; 256];
        let width = self.bounds.width().max(0) as usize;
        for row in self.pix.chunks_exact(self.stride.max(1)) {
            for &i in &row[..width] {
                present[i as usize] = true;
            }
        }
        self.palette
            .iter()
            .enumerate()
            .all(|(i, c)| !present[i] || c[3] == 0xff)
    }
}

impl Source for Paletted {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn reader(&self) -> Reader<'_> {
        Reader::paletted(self)
    }

    fn is_opaque(&self) -> bool {
        Paletted::is_opaque(self)
    }
}

impl Target for Paletted {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn writer(&mut self) -> Writer<'_> {
        Writer::paletted(self)
    }
}

// ============================================================================
// YCbCr
// ============================================================================

/// Planar luma/chroma image (JPEG style, full-range BT.601).
///
/// Chroma planes are subsampled according to [`SubsampleRatio`]. The storage
/// is read-only from the accessor's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YCbCr {
    pub(crate) bounds: Rect,
    pub(crate) ratio: SubsampleRatio,
    pub(crate) y_stride: usize,
    pub(crate) c_stride: usize,
    pub(crate) y: Vec<u8>,
    pub(crate) cb: Vec<u8>,
    pub(crate) cr: Vec<u8>,
}

impl YCbCr {
    /// Allocates zeroed planes.
    pub fn new(bounds: Rect, ratio: SubsampleRatio) -> Self {
        let w = bounds.width().max(0) as usize;
        let h = bounds.height().max(0) as usize;
        let (cw, ch) = ratio.chroma_size(&bounds);
        let (cw, ch) = (cw as usize, ch as usize);
        Self {
            bounds,
            ratio,
            y_stride: w,
            c_stride: cw,
            y: vec![0; w * h],
            cb: vec![0; cw * ch],
            cr: vec![0; cw * ch],
        }
    }

    /// Wraps existing tightly packed planes.
    pub fn from_planes(
        bounds: Rect,
        ratio: SubsampleRatio,
        y: Vec<u8>,
        cb: Vec<u8>,
        cr: Vec<u8>,
    ) -> Result<Self> {
        let mut img = Self::new(bounds, ratio);
        for (plane, got) in [(&img.y, &y), (&img.cb, &cb), (&img.cr, &cr)] {
            if plane.len() != got.len() {
                return Err(Error::BufferSize {
                    expected: plane.len(),
                    actual: got.len(),
                });
            }
        }
        img.y = y;
        img.cb = cb;
        img.cr = cr;
        Ok(img)
    }

    /// Pixel rectangle.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Chroma subsampling.
    #[inline]
    pub fn ratio(&self) -> SubsampleRatio {
        self.ratio
    }

    /// Index of `(x, y)` in the luma plane. Coordinates must be in bounds.
    #[inline]
    pub fn y_offset(&self, x: i32, y: i32) -> usize {
        (y - self.bounds.min_y) as usize * self.y_stride + (x - self.bounds.min_x) as usize
    }

    /// Index of `(x, y)` in the chroma planes. Coordinates must be in bounds.
    #[inline]
    pub fn c_offset(&self, x: i32, y: i32) -> usize {
        let (sx, sy) = self.ratio.factors();
        let b = &self.bounds;
        (y / sy - b.min_y / sy) as usize * self.c_stride + (x / sx - b.min_x / sx) as usize
    }

    /// Luma plane.
    #[inline]
    pub fn y_plane(&self) -> &[u8] {
        &self.y
    }

    /// Blue-difference chroma plane.
    #[inline]
    pub fn cb_plane(&self) -> &[u8] {
        &self.cb
    }

    /// Red-difference chroma plane.
    #[inline]
    pub fn cr_plane(&self) -> &[u8] {
        &self.cr
    }

    /// Mutable luma, Cb and Cr planes.
    #[inline]
    pub fn planes_mut(&mut self) -> (&mut [u8], &mut [u8], &mut [u8]) {
        (&mut self.y, &mut self.cb, &mut self.cr)
    }
}

impl Source for YCbCr {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn reader(&self) -> Reader<'_> {
        Reader::ycbcr(self)
    }

    fn is_opaque(&self) -> bool {
        true
    }
}

// ============================================================================
// Generic
// ============================================================================

/// Adapter exposing a [`ColorSource`] / [`ColorSink`] as an image.
///
/// ```rust
/// use filtra_core::{ColorSource, Generic, Rect, Source};
///
/// struct Checker;
///
/// impl ColorSource for Checker {
///     fn bounds(&self) -> Rect {
///         Rect::from_size(4, 4)
///     }
///     fn color_at(&self, x: i32, y: i32) -> [u16; 4] {
///         let v = if (x + y) % 2 == 0 { 0xffff } else { 0 };
///         [v, v, v, 0xffff]
///     }
/// }
///
/// let img = Generic(Checker);
/// assert_eq!(img.reader().pixel(1, 1).r, 1.0);
/// assert!(!img.is_opaque());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Generic<T>(pub T);

impl<T: ColorSource> Source for Generic<T> {
    fn bounds(&self) -> Rect {
        self.0.bounds()
    }

    fn reader(&self) -> Reader<'_> {
        Reader::generic(&self.0)
    }
}

impl<T: ColorSink> Target for Generic<T> {
    fn bounds(&self) -> Rect {
        self.0.bounds()
    }

    fn writer(&mut self) -> Writer<'_> {
        Writer::generic(&mut self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_new() {
        let img = Raster::new(RasterFormat::Rgba16, Rect::new(-1, -1, 3, 1));
        assert_eq!(img.stride(), 32);
        assert_eq!(img.pix().len(), 64);
        assert_eq!(img.offset(-1, -1), Some(0));
        assert_eq!(img.offset(0, 0), Some(40));
        assert_eq!(img.offset(3, 0), None);
    }

    #[test]
    fn test_raster_from_pix_size() {
        let ok = Raster::from_pix(RasterFormat::Gray8, Rect::from_size(3, 2), vec![0; 6]);
        assert!(ok.is_ok());
        let err = Raster::from_pix(RasterFormat::Gray8, Rect::from_size(3, 2), vec![0; 5]);
        assert_eq!(
            err.unwrap_err(),
            Error::BufferSize {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn test_raster_opaque() {
        let mut img = Raster::new(RasterFormat::Rgba8, Rect::from_size(2, 2));
        assert!(!img.is_opaque());
        for p in img.pix_mut().chunks_exact_mut(4) {
            p[3] = 0xff;
        }
        assert!(img.is_opaque());

        let gray = Raster::new(RasterFormat::Gray16, Rect::from_size(2, 2));
        assert!(gray.is_opaque());

        let mut deep = Raster::new(RasterFormat::Rgba16, Rect::from_size(1, 1));
        deep.pix_mut()[6] = 0xff;
        assert!(!deep.is_opaque());
        deep.pix_mut()[7] = 0xff;
        assert!(deep.is_opaque());
    }

    #[test]
    fn test_view_mut_clips() {
        let mut img = Raster::new(RasterFormat::Gray8, Rect::from_size(4, 4));
        {
            let mut view = img.view_mut(Rect::new(1, 1, 3, 3));
            assert_eq!(view.bounds(), Rect::new(1, 1, 3, 3));
            let mut w = view.writer();
            w.set_pixel(0, 0, Pixel::WHITE);
            w.set_pixel(2, 2, Pixel::WHITE);
        }
        assert_eq!(img.pix()[0], 0);
        assert_eq!(img.pix()[2 * 4 + 2], 255);
    }

    #[test]
    fn test_paletted_opaque() {
        let palette = vec![[0, 0, 0, 255], [255, 255, 255, 0]];
        let mut img = Paletted::new(Rect::from_size(2, 1), palette).unwrap();
        assert!(img.is_opaque());
        img.pix_mut()[1] = 1;
        assert!(!img.is_opaque());
        assert_eq!(img.index_at(1, 0), Some(1));
        assert_eq!(img.index_at(2, 0), None);
    }

    #[test]
    fn test_paletted_too_large() {
        let palette = vec![[0u8; 4]; 257];
        assert_eq!(
            Paletted::new(Rect::from_size(1, 1), palette).unwrap_err(),
            Error::PaletteTooLarge(257)
        );
    }

    #[test]
    fn test_ycbcr_offsets() {
        let img = YCbCr::new(Rect::new(0, 0, 4, 4), SubsampleRatio::R420);
        assert_eq!(img.cb_plane().len(), 4);
        assert_eq!(img.c_offset(3, 3), 3);
        assert_eq!(img.c_offset(1, 2), 2);
        assert_eq!(img.y_offset(3, 1), 7);
        assert!(img.is_opaque());
    }
}
