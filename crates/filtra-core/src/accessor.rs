//! Format-agnostic pixel access.
//!
//! A [`Reader`] or [`Writer`] is built once per image. Construction resolves
//! the concrete storage into a closed tagged variant (and converts palettes to
//! canonical pixels), after which every access is a `match` on that tag plus a
//! direct slice index.
//!
//! # Canonical form
//!
//! All conversions go to and from [`Pixel`]: `f32` channels with
//! non-premultiplied alpha.
//!
//! | storage            | read                                 | write                                   |
//! |--------------------|--------------------------------------|-----------------------------------------|
//! | RGBA 8/16          | sample / max                         | `quantize(c * max)`                     |
//! | premultiplied RGBA | colour / alpha (a=0 -> transparent)  | `quantize(c * a * max)`                 |
//! | gray 8/16          | `(v, v, v, 1)`                       | `quantize(luma * a * max)`              |
//! | YCbCr              | integer BT.601 transform             | not writable                            |
//! | paletted           | precomputed palette entry            | nearest palette entry                   |
//! | generic            | 16-bit callback                      | 16-bit callback                         |
//!
//! # Parallel writes
//!
//! A writer can be split into disjoint row bands with [`Writer::split_rows`].
//! Each band owns its slice of the destination bytes, so bands can be handed
//! to different threads without any locking.

use std::ops::Range;
use std::sync::Arc;

use crate::format::{PixelFormat, RasterFormat};
use crate::image::{ColorSink, ColorSource, Paletted, Raster, YCbCr};
use crate::pixel::{quantize_u16, quantize_u8, Pixel, LUMA_B, LUMA_G, LUMA_R, QF16, QF8};
use crate::rect::{Point, Rect};

/// Squared distance under which a palette entry counts as an exact match.
const PALETTE_EPSILON: f32 = QF16 * QF16 / 2.0;

// ============================================================================
// Reader
// ============================================================================

/// Read accessor bound to one image.
pub struct Reader<'a> {
    bounds: Rect,
    kind: ReadKind<'a>,
}

enum ReadKind<'a> {
    Raster {
        format: RasterFormat,
        pix: &'a [u8],
        stride: usize,
    },
    YCbCr(&'a YCbCr),
    Paletted {
        pix: &'a [u8],
        stride: usize,
        palette: Vec<Pixel>,
    },
    Generic(&'a dyn ColorSource),
}

impl<'a> Reader<'a> {
    /// Reader over a raster.
    pub fn raster(img: &'a Raster) -> Self {
        Self {
            bounds: img.bounds,
            kind: ReadKind::Raster {
                format: img.format,
                pix: &img.pix,
                stride: img.stride,
            },
        }
    }

    /// Reader over a paletted image; converts the palette once.
    pub fn paletted(img: &'a Paletted) -> Self {
        Self {
            bounds: img.bounds,
            kind: ReadKind::Paletted {
                pix: &img.pix,
                stride: img.stride,
                palette: canonical_palette(&img.palette),
            },
        }
    }

    /// Reader over a planar luma/chroma image.
    pub fn ycbcr(img: &'a YCbCr) -> Self {
        Self {
            bounds: img.bounds,
            kind: ReadKind::YCbCr(img),
        }
    }

    /// Reader over a custom colour source.
    pub fn generic(src: &'a dyn ColorSource) -> Self {
        Self {
            bounds: src.bounds(),
            kind: ReadKind::Generic(src),
        }
    }

    /// Bounds of the underlying image.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Storage tag.
    pub fn format(&self) -> PixelFormat {
        match &self.kind {
            ReadKind::Raster { format, .. } => PixelFormat::Raster(*format),
            ReadKind::YCbCr(img) => PixelFormat::YCbCr(img.ratio),
            ReadKind::Paletted { .. } => PixelFormat::Paletted,
            ReadKind::Generic(_) => PixelFormat::Generic,
        }
    }

    /// Canonical pixel at `(x, y)`.
    ///
    /// Coordinates outside the bounds read as [`Pixel::TRANSPARENT`]; filters
    /// clamp their coordinates before reading.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Pixel {
        if !self.bounds.contains(x, y) {
            return Pixel::TRANSPARENT;
        }
        let dx = (x - self.bounds.min_x) as usize;
        let dy = (y - self.bounds.min_y) as usize;
        match &self.kind {
            ReadKind::Raster {
                format,
                pix,
                stride,
            } => {
                let bpp = format.bytes_per_pixel();
                let i = dy * stride + dx * bpp;
                decode(*format, &pix[i..i + bpp])
            }
            ReadKind::YCbCr(img) => {
                let yi = img.y_offset(x, y);
                let ci = img.c_offset(x, y);
                let [r, g, b] = ycbcr_to_rgb(img.y[yi], img.cb[ci], img.cr[ci]);
                Pixel::new(r as f32 * QF8, g as f32 * QF8, b as f32 * QF8, 1.0)
            }
            ReadKind::Paletted {
                pix,
                stride,
                palette,
            } => {
                let idx = pix[dy * stride + dx] as usize;
                palette.get(idx).copied().unwrap_or(Pixel::TRANSPARENT)
            }
            ReadKind::Generic(src) => from_color16(src.color_at(x, y)),
        }
    }

    /// Reads row `y` from `min_x` to `max_x` into `buf`.
    pub fn row(&self, y: i32, buf: &mut Vec<Pixel>) {
        buf.clear();
        if let ReadKind::Raster {
            format,
            pix,
            stride,
        } = &self.kind
        {
            if y >= self.bounds.min_y && y < self.bounds.max_y {
                let bpp = format.bytes_per_pixel();
                let start = (y - self.bounds.min_y) as usize * stride;
                let line = &pix[start..start + self.bounds.width() as usize * bpp];
                buf.extend(line.chunks_exact(bpp).map(|p| decode(*format, p)));
                return;
            }
        }
        buf.extend((self.bounds.min_x..self.bounds.max_x).map(|x| self.pixel(x, y)));
    }

    /// Reads column `x` from `min_y` to `max_y` into `buf`.
    pub fn column(&self, x: i32, buf: &mut Vec<Pixel>) {
        buf.clear();
        buf.extend((self.bounds.min_y..self.bounds.max_y).map(|y| self.pixel(x, y)));
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Write accessor bound to one image, or to a band of its rows.
pub struct Writer<'a> {
    /// Writable rectangle; everything else is dropped.
    bounds: Rect,
    /// Image coordinates of the first byte of `pix`.
    origin: Point,
    kind: WriteKind<'a>,
}

enum WriteKind<'a> {
    Raster {
        format: RasterFormat,
        pix: &'a mut [u8],
        stride: usize,
    },
    Paletted {
        pix: &'a mut [u8],
        stride: usize,
        palette: Arc<[Pixel]>,
    },
    Generic(&'a mut dyn ColorSink),
}

impl<'a> Writer<'a> {
    /// Writer over a whole raster.
    pub fn raster(img: &'a mut Raster) -> Self {
        let bounds = img.bounds;
        Self::raster_view(img, bounds)
    }

    /// Writer over the part of a raster inside `clip`.
    pub fn raster_view(img: &'a mut Raster, clip: Rect) -> Self {
        Self {
            bounds: img.bounds.intersect(&clip),
            origin: img.bounds.min(),
            kind: WriteKind::Raster {
                format: img.format,
                pix: &mut img.pix,
                stride: img.stride,
            },
        }
    }

    /// Writer over a paletted image.
    pub fn paletted(img: &'a mut Paletted) -> Self {
        let palette: Arc<[Pixel]> = canonical_palette(&img.palette).into();
        Self {
            bounds: img.bounds,
            origin: img.bounds.min(),
            kind: WriteKind::Paletted {
                pix: &mut img.pix,
                stride: img.stride,
                palette,
            },
        }
    }

    /// Writer over a custom colour sink.
    pub fn generic(sink: &'a mut dyn ColorSink) -> Self {
        let bounds = sink.bounds();
        Self {
            bounds,
            origin: bounds.min(),
            kind: WriteKind::Generic(sink),
        }
    }

    /// Writable rectangle.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Storage tag.
    pub fn format(&self) -> PixelFormat {
        match &self.kind {
            WriteKind::Raster { format, .. } => PixelFormat::Raster(*format),
            WriteKind::Paletted { .. } => PixelFormat::Paletted,
            WriteKind::Generic(_) => PixelFormat::Generic,
        }
    }

    #[inline]
    fn index(&self, x: i32, y: i32, stride: usize, bpp: usize) -> usize {
        (y - self.origin.y) as usize * stride + (x - self.origin.x) as usize * bpp
    }

    /// Reads back the stored pixel at `(x, y)`; transparent outside the bounds.
    pub fn pixel(&self, x: i32, y: i32) -> Pixel {
        if !self.bounds.contains(x, y) {
            return Pixel::TRANSPARENT;
        }
        match &self.kind {
            WriteKind::Raster { format, pix, stride } => {
                let bpp = format.bytes_per_pixel();
                let i = self.index(x, y, *stride, bpp);
                pix.get(i..i + bpp)
                    .map_or(Pixel::TRANSPARENT, |p| decode(*format, p))
            }
            WriteKind::Paletted {
                pix,
                stride,
                palette,
            } => {
                let i = self.index(x, y, *stride, 1);
                pix.get(i)
                    .and_then(|&idx| palette.get(idx as usize).copied())
                    .unwrap_or(Pixel::TRANSPARENT)
            }
            WriteKind::Generic(sink) => from_color16(sink.color_at(x, y)),
        }
    }

    /// Stores `px` at `(x, y)`. Writes outside the bounds are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, px: Pixel) {
        if !self.bounds.contains(x, y) {
            return;
        }
        let origin = self.origin;
        match &mut self.kind {
            WriteKind::Raster { format, pix, stride } => {
                let bpp = format.bytes_per_pixel();
                let i = (y - origin.y) as usize * *stride + (x - origin.x) as usize * bpp;
                if let Some(p) = pix.get_mut(i..i + bpp) {
                    encode(*format, p, px);
                }
            }
            WriteKind::Paletted {
                pix,
                stride,
                palette,
            } => {
                let i = (y - origin.y) as usize * *stride + (x - origin.x) as usize;
                if let Some(p) = pix.get_mut(i) {
                    *p = nearest_palette_index(palette, px) as u8;
                }
            }
            WriteKind::Generic(sink) => sink.set_color(x, y, px.to_rgba16()),
        }
    }

    /// Writes `row` into line `y`, starting at `bounds.min_x`.
    pub fn set_row(&mut self, y: i32, row: &[Pixel]) {
        let x0 = self.bounds.min_x;
        for (x, px) in (x0..self.bounds.max_x).zip(row) {
            self.set_pixel(x, y, *px);
        }
    }

    /// Writes `col` into column `x`, starting at `bounds.min_y`.
    pub fn set_column(&mut self, x: i32, col: &[Pixel]) {
        let y0 = self.bounds.min_y;
        for (y, px) in (y0..self.bounds.max_y).zip(col) {
            self.set_pixel(x, y, *px);
        }
    }

    /// Whether the writer can be split into independent row bands.
    ///
    /// Generic sinks are a single `&mut` handle and cannot.
    #[inline]
    pub fn can_split(&self) -> bool {
        !matches!(self.kind, WriteKind::Generic(_))
    }

    /// Splits the writer into one band per row range.
    ///
    /// `ranges` must be ascending and non-overlapping. Each band may only
    /// write rows of its own range (clipped to the writer's bounds). A writer
    /// that cannot be split is returned whole as a single band.
    pub fn split_rows(self, ranges: &[Range<i32>]) -> Vec<Writer<'a>> {
        let Writer {
            bounds,
            origin,
            kind,
        } = self;
        match kind {
            WriteKind::Raster {
                format,
                pix,
                stride,
            } => split_bands(pix, stride, bounds, origin, ranges)
                .into_iter()
                .map(|(bounds, origin, pix)| Writer {
                    bounds,
                    origin,
                    kind: WriteKind::Raster {
                        format,
                        pix,
                        stride,
                    },
                })
                .collect(),
            WriteKind::Paletted {
                pix,
                stride,
                palette,
            } => split_bands(pix, stride, bounds, origin, ranges)
                .into_iter()
                .map(|(bounds, origin, pix)| Writer {
                    bounds,
                    origin,
                    kind: WriteKind::Paletted {
                        pix,
                        stride,
                        palette: Arc::clone(&palette),
                    },
                })
                .collect(),
            WriteKind::Generic(sink) => vec![Writer {
                bounds,
                origin,
                kind: WriteKind::Generic(sink),
            }],
        }
    }
}

/// Carves `pix` into disjoint row slices, one per range.
fn split_bands<'a>(
    mut pix: &'a mut [u8],
    stride: usize,
    bounds: Rect,
    origin: Point,
    ranges: &[Range<i32>],
) -> Vec<(Rect, Point, &'a mut [u8])> {
    debug_assert!(ranges.windows(2).all(|w| w[0].end <= w[1].start));
    let mut out = Vec::with_capacity(ranges.len());
    // Image row held by pix[0].
    let mut row = origin.y;
    for r in ranges {
        let start = r.start.max(bounds.min_y).max(row);
        let end = r.end.min(bounds.max_y);
        if start >= end {
            out.push((Rect::EMPTY, origin, Default::default()));
            continue;
        }
        let rest = std::mem::take(&mut pix);
        let skip = ((start - row) as usize * stride).min(rest.len());
        let (_, rest) = rest.split_at_mut(skip);
        let take = ((end - start) as usize * stride).min(rest.len());
        let (band, rest) = rest.split_at_mut(take);
        pix = rest;
        row = end;
        out.push((
            Rect::new(bounds.min_x, start, bounds.max_x, end),
            Point::new(origin.x, start),
            band,
        ));
    }
    out
}

// ============================================================================
// Conversions
// ============================================================================

#[inline]
fn be16(p: &[u8], i: usize) -> u16 {
    u16::from_be_bytes([p[i], p[i + 1]])
}

#[inline]
fn put16(p: &mut [u8], i: usize, v: u16) {
    let [hi, lo] = v.to_be_bytes();
    p[i] = hi;
    p[i + 1] = lo;
}

/// Decodes one raster cell into a canonical pixel.
pub fn decode(format: RasterFormat, p: &[u8]) -> Pixel {
    match format {
        RasterFormat::Rgba8 => Pixel::new(
            p[0] as f32 * QF8,
            p[1] as f32 * QF8,
            p[2] as f32 * QF8,
            p[3] as f32 * QF8,
        ),
        RasterFormat::Rgba16 => Pixel::new(
            be16(p, 0) as f32 * QF16,
            be16(p, 2) as f32 * QF16,
            be16(p, 4) as f32 * QF16,
            be16(p, 6) as f32 * QF16,
        ),
        RasterFormat::PremulRgba8 => match p[3] {
            0 => Pixel::TRANSPARENT,
            0xff => Pixel::new(p[0] as f32 * QF8, p[1] as f32 * QF8, p[2] as f32 * QF8, 1.0),
            a => {
                let q = 1.0 / a as f32;
                Pixel::new(
                    p[0] as f32 * q,
                    p[1] as f32 * q,
                    p[2] as f32 * q,
                    a as f32 * QF8,
                )
            }
        },
        RasterFormat::PremulRgba16 => match be16(p, 6) {
            0 => Pixel::TRANSPARENT,
            0xffff => Pixel::new(
                be16(p, 0) as f32 * QF16,
                be16(p, 2) as f32 * QF16,
                be16(p, 4) as f32 * QF16,
                1.0,
            ),
            a => {
                let q = 1.0 / a as f32;
                Pixel::new(
                    be16(p, 0) as f32 * q,
                    be16(p, 2) as f32 * q,
                    be16(p, 4) as f32 * q,
                    a as f32 * QF16,
                )
            }
        },
        RasterFormat::Gray8 => Pixel::gray(p[0] as f32 * QF8),
        RasterFormat::Gray16 => Pixel::gray(be16(p, 0) as f32 * QF16),
    }
}

/// Encodes a canonical pixel into one raster cell.
pub fn encode(format: RasterFormat, p: &mut [u8], px: Pixel) {
    match format {
        RasterFormat::Rgba8 => {
            p[0] = quantize_u8(px.r * 255.0);
            p[1] = quantize_u8(px.g * 255.0);
            p[2] = quantize_u8(px.b * 255.0);
            p[3] = quantize_u8(px.a * 255.0);
        }
        RasterFormat::Rgba16 => {
            put16(p, 0, quantize_u16(px.r * 65535.0));
            put16(p, 2, quantize_u16(px.g * 65535.0));
            put16(p, 4, quantize_u16(px.b * 65535.0));
            put16(p, 6, quantize_u16(px.a * 65535.0));
        }
        RasterFormat::PremulRgba8 => {
            let fa = px.a * 255.0;
            p[0] = quantize_u8(px.r * fa);
            p[1] = quantize_u8(px.g * fa);
            p[2] = quantize_u8(px.b * fa);
            p[3] = quantize_u8(fa);
        }
        RasterFormat::PremulRgba16 => {
            let fa = px.a * 65535.0;
            put16(p, 0, quantize_u16(px.r * fa));
            put16(p, 2, quantize_u16(px.g * fa));
            put16(p, 4, quantize_u16(px.b * fa));
            put16(p, 6, quantize_u16(fa));
        }
        RasterFormat::Gray8 => {
            p[0] = quantize_u8((LUMA_R * px.r + LUMA_G * px.g + LUMA_B * px.b) * px.a * 255.0);
        }
        RasterFormat::Gray16 => {
            let v = (LUMA_R * px.r + LUMA_G * px.g + LUMA_B * px.b) * px.a * 65535.0;
            put16(p, 0, quantize_u16(v));
        }
    }
}

/// 16-bit non-premultiplied colour to canonical form.
#[inline]
fn from_color16(c: [u16; 4]) -> Pixel {
    if c[3] == 0 {
        Pixel::TRANSPARENT
    } else {
        Pixel::from_rgba16(c)
    }
}

fn canonical_palette(palette: &[[u8; 4]]) -> Vec<Pixel> {
    palette
        .iter()
        .map(|&c| {
            if c[3] == 0 {
                Pixel::TRANSPARENT
            } else {
                Pixel::from_rgba8(c)
            }
        })
        .collect()
}

/// Index of the palette entry closest to `px` (squared RGBA distance).
///
/// The pixel is clamped to `[0, 1]` first. Ties keep the earliest entry;
/// an empty palette yields index 0.
pub fn nearest_palette_index(palette: &[Pixel], px: Pixel) -> usize {
    let px = px.clamped();
    let mut best = 0;
    let mut dmin = f32::MAX;
    for (i, c) in palette.iter().enumerate() {
        let dr = px.r - c.r;
        let dg = px.g - c.g;
        let db = px.b - c.b;
        let da = px.a - c.a;
        let d = dr * dr + dg * dg + db * db + da * da;
        if d < PALETTE_EPSILON {
            return i;
        }
        if d < dmin {
            dmin = d;
            best = i;
        }
    }
    best
}

/// Full-range BT.601 YCbCr to RGB, in 16.16 fixed point.
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let yy = y as i32 * 0x10101;
    let cb = cb as i32 - 128;
    let cr = cr as i32 - 128;
    let clamp = |v: i32| (v >> 16).clamp(0, 0xff) as u8;
    [
        clamp(yy + 91881 * cr),
        clamp(yy - 22554 * cb - 46802 * cr),
        clamp(yy + 116130 * cb),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::SubsampleRatio;
    use approx::assert_abs_diff_eq;

    fn px_eq(a: Pixel, b: Pixel) {
        assert_abs_diff_eq!(a.r, b.r, epsilon = 1e-5);
        assert_abs_diff_eq!(a.g, b.g, epsilon = 1e-5);
        assert_abs_diff_eq!(a.b, b.b, epsilon = 1e-5);
        assert_abs_diff_eq!(a.a, b.a, epsilon = 1e-5);
    }

    #[test]
    fn test_read_rgba8() {
        let img = Raster::from_pix(
            RasterFormat::Rgba8,
            Rect::new(-1, -1, 0, 0),
            vec![0x00, 0x80, 0xff, 0x40],
        )
        .unwrap();
        let r = Reader::raster(&img);
        px_eq(r.pixel(-1, -1), Pixel::new(0.0, 128.0 / 255.0, 1.0, 64.0 / 255.0));
        px_eq(r.pixel(0, 0), Pixel::TRANSPARENT);
    }

    #[test]
    fn test_read_premultiplied() {
        let img = Raster::from_pix(
            RasterFormat::PremulRgba8,
            Rect::from_size(3, 1),
            vec![10, 20, 30, 0, 10, 20, 30, 255, 10, 20, 30, 40],
        )
        .unwrap();
        let r = Reader::raster(&img);
        px_eq(r.pixel(0, 0), Pixel::TRANSPARENT);
        px_eq(r.pixel(1, 0), Pixel::new(10.0 / 255.0, 20.0 / 255.0, 30.0 / 255.0, 1.0));
        px_eq(r.pixel(2, 0), Pixel::new(0.25, 0.5, 0.75, 40.0 / 255.0));
    }

    #[test]
    fn test_read_premultiplied16() {
        let mut pix = vec![0u8; 8];
        pix[..2].copy_from_slice(&0x1000u16.to_be_bytes());
        pix[6..].copy_from_slice(&0x2000u16.to_be_bytes());
        let img = Raster::from_pix(RasterFormat::PremulRgba16, Rect::from_size(1, 1), pix).unwrap();
        px_eq(img.get(0, 0), Pixel::new(0.5, 0.0, 0.0, 0x2000 as f32 / 65535.0));
    }

    #[test]
    fn test_read_gray16() {
        let img = Raster::from_pix(RasterFormat::Gray16, Rect::from_size(1, 1), vec![0x80, 0x00])
            .unwrap();
        px_eq(img.get(0, 0), Pixel::gray(0x8000 as f32 / 65535.0));
    }

    #[test]
    fn test_write_gray_uses_luma_and_alpha() {
        let mut img = Raster::new(RasterFormat::Gray8, Rect::from_size(2, 1));
        img.set(0, 0, Pixel::new(1.0, 0.0, 0.0, 1.0));
        img.set(1, 0, Pixel::new(1.0, 1.0, 1.0, 0.4));
        assert_eq!(img.pix(), &[76, 102]);
    }

    #[test]
    fn test_write_premultiplied() {
        let mut img = Raster::new(RasterFormat::PremulRgba8, Rect::from_size(1, 1));
        img.set(0, 0, Pixel::new(1.0, 0.5, 0.0, 0.5));
        assert_eq!(img.pix(), &[128, 64, 0, 128]);
    }

    #[test]
    fn test_write_out_of_bounds_is_ignored() {
        let mut img = Raster::new(RasterFormat::Rgba8, Rect::from_size(1, 1));
        img.set(1, 0, Pixel::WHITE);
        img.set(-1, 0, Pixel::WHITE);
        assert_eq!(img.pix(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_write_saturates() {
        let mut img = Raster::new(RasterFormat::Rgba16, Rect::from_size(1, 1));
        img.set(0, 0, Pixel::new(2.0, -1.0, 0.5, 1.0));
        assert_eq!(img.pix(), &[0xff, 0xff, 0, 0, 0x80, 0x00, 0xff, 0xff]);
    }

    #[test]
    fn test_roundtrip_all_rasters() {
        let formats = [
            RasterFormat::Rgba8,
            RasterFormat::Rgba16,
            RasterFormat::PremulRgba8,
            RasterFormat::PremulRgba16,
            RasterFormat::Gray8,
            RasterFormat::Gray16,
        ];
        for format in formats {
            let bpp = format.bytes_per_pixel();
            let mut pix = Vec::new();
            for v in [0u8, 0x7b, 0xff] {
                for _ in 0..bpp {
                    pix.push(v);
                }
            }
            let src = Raster::from_pix(format, Rect::from_size(3, 1), pix.clone()).unwrap();
            let mut dst = Raster::new(format, Rect::from_size(3, 1));
            let reader = Reader::raster(&src);
            let mut writer = Writer::raster(&mut dst);
            for x in 0..3 {
                writer.set_pixel(x, 0, reader.pixel(x, 0));
            }
            for (a, b) in dst.pix().iter().zip(&pix) {
                assert!((*a as i32 - *b as i32).abs() <= 1, "{format:?}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn test_palette_nearest() {
        let palette = canonical_palette(&[
            [0, 0, 0, 255],
            [255, 0, 0, 255],
            [255, 0, 0, 255],
            [0, 0, 255, 255],
        ]);
        assert_eq!(nearest_palette_index(&palette, Pixel::new(0.9, 0.1, 0.0, 1.0)), 1);
        assert_eq!(nearest_palette_index(&palette, Pixel::new(1.0, 0.0, 0.0, 1.0)), 1);
        assert_eq!(nearest_palette_index(&palette, Pixel::new(0.1, 0.0, 2.0, 1.0)), 3);
        assert_eq!(nearest_palette_index(&[], Pixel::WHITE), 0);
    }

    #[test]
    fn test_paletted_roundtrip() {
        let palette = vec![[0, 0, 0, 255], [255, 255, 255, 255], [255, 0, 0, 128]];
        let src = Paletted::from_pix(Rect::from_size(3, 1), vec![2, 1, 0], palette.clone()).unwrap();
        let mut dst = Paletted::new(Rect::from_size(3, 1), palette).unwrap();
        let reader = Reader::paletted(&src);
        let mut writer = Writer::paletted(&mut dst);
        for x in 0..3 {
            writer.set_pixel(x, 0, reader.pixel(x, 0));
        }
        assert_eq!(dst.pix(), &[2, 1, 0]);
    }

    #[test]
    fn test_ycbcr_to_rgb() {
        assert_eq!(ycbcr_to_rgb(0, 128, 128), [0, 0, 0]);
        assert_eq!(ycbcr_to_rgb(255, 128, 128), [255, 255, 255]);
        assert_eq!(ycbcr_to_rgb(76, 85, 255), [254, 0, 0]);
    }

    #[test]
    fn test_read_ycbcr_subsampled() {
        let mut img = YCbCr::new(Rect::new(0, 0, 4, 2), SubsampleRatio::R422);
        {
            let (y, cb, cr) = img.planes_mut();
            y.fill(255);
            cb.fill(128);
            cr.fill(128);
            y[0] = 0;
        }
        let r = Reader::ycbcr(&img);
        assert_eq!(r.format(), PixelFormat::YCbCr(SubsampleRatio::R422));
        px_eq(r.pixel(0, 0), Pixel::BLACK);
        px_eq(r.pixel(3, 1), Pixel::WHITE);
    }

    #[test]
    fn test_row_and_column() {
        let img = Raster::from_pix(
            RasterFormat::Gray8,
            Rect::new(-1, -1, 2, 1),
            vec![0, 51, 102, 153, 204, 255],
        )
        .unwrap();
        let r = Reader::raster(&img);
        let mut buf = Vec::new();
        r.row(0, &mut buf);
        assert_eq!(buf.len(), 3);
        px_eq(buf[2], Pixel::WHITE);
        r.column(0, &mut buf);
        assert_eq!(buf.len(), 2);
        px_eq(buf[0], Pixel::gray(0.2));
        px_eq(buf[1], Pixel::gray(0.8));
    }

    #[test]
    fn test_set_row_and_column() {
        let mut img = Raster::new(RasterFormat::Gray8, Rect::new(-1, -1, 2, 1));
        let mut w = Writer::raster(&mut img);
        w.set_row(-1, &[Pixel::WHITE, Pixel::WHITE, Pixel::WHITE, Pixel::WHITE]);
        w.set_column(1, &[Pixel::BLACK, Pixel::WHITE]);
        assert_eq!(img.pix(), &[255, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn test_split_rows_disjoint() {
        let mut img = Raster::new(RasterFormat::Gray8, Rect::new(0, 10, 2, 15));
        let writer = Writer::raster(&mut img);
        let bands = writer.split_rows(&[10..12, 12..13, 13..15]);
        assert_eq!(bands.len(), 3);
        for (i, mut band) in bands.into_iter().enumerate() {
            let b = band.bounds();
            for y in b.min_y..b.max_y {
                band.set_row(y, &[Pixel::gray((i + 1) as f32 / 4.0); 2]);
            }
            // the next band's first row is out of reach
            band.set_pixel(0, b.max_y, Pixel::WHITE);
        }
        assert_eq!(img.pix(), &[64, 64, 64, 64, 128, 128, 191, 191, 191, 191]);
    }
}
