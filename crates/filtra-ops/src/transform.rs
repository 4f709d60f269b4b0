//! Geometric transformations.
//!
//! # Exact transforms
//!
//! [`Transform`] covers the lossless permutations: quarter-turn rotations,
//! flips, transpose and transverse. Every output pixel is copied from exactly
//! one source pixel; each destination row is a source row or column, possibly
//! reversed.
//!
//! ```text
//! source       Rotate90    FlipHorizontal   Transpose
//! 1 2 3 4      4 8         4 3 2 1          1 5
//! 5 6 7 8      3 7         8 7 6 5          2 6
//!              2 6                          3 7
//!              1 5                          4 8
//! ```
//!
//! # Arbitrary rotation
//!
//! [`Rotate`] maps every destination pixel back into the source around the
//! image centres and samples it with the chosen [`Interpolation`]. Uncovered
//! areas receive the background pixel.
//!
//! # Cropping
//!
//! [`Crop`] cuts a rectangle out of the source; [`CropToSize`] places a
//! rectangle of a given size with an [`Anchor`].

use filtra_core::{Pixel, Point, Reader, Rect, Source, Target};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filter::{Filter, Options};
use crate::parallel::parallelize_rows;

// ============================================================================
// Exact transforms
// ============================================================================

/// Lossless geometric permutation. Rotations are counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Quarter turn counter-clockwise.
    Rotate90,
    /// Half turn.
    Rotate180,
    /// Three quarter turns counter-clockwise.
    Rotate270,
    /// Mirror left to right.
    FlipHorizontal,
    /// Mirror top to bottom.
    FlipVertical,
    /// Flip horizontally, then rotate 90 degrees counter-clockwise.
    Transpose,
    /// Flip vertically, then rotate 90 degrees counter-clockwise.
    Transverse,
}

/// Where a destination row comes from.
#[derive(Debug, Clone, Copy)]
struct SourceLine {
    column: bool,
    /// Offset from the source minimum along the other axis.
    index: i32,
    reversed: bool,
}

impl Transform {
    /// True when output width and height are swapped.
    #[inline]
    pub fn swaps_axes(&self) -> bool {
        matches!(
            self,
            Transform::Rotate90 | Transform::Rotate270 | Transform::Transpose | Transform::Transverse
        )
    }

    /// Maps destination offset `(i, j)` to a source offset for a `w x h` source.
    pub fn source_of(&self, i: i32, j: i32, w: i32, h: i32) -> (i32, i32) {
        match self {
            Transform::Rotate90 => (w - 1 - j, i),
            Transform::Rotate180 => (w - 1 - i, h - 1 - j),
            Transform::Rotate270 => (j, h - 1 - i),
            Transform::FlipHorizontal => (w - 1 - i, j),
            Transform::FlipVertical => (i, h - 1 - j),
            Transform::Transpose => (j, i),
            Transform::Transverse => (w - 1 - j, h - 1 - i),
        }
    }

    fn line(&self, j: i32, w: i32, h: i32) -> SourceLine {
        let (column, index, reversed) = match self {
            Transform::Rotate90 => (true, w - 1 - j, false),
            Transform::Rotate180 => (false, h - 1 - j, true),
            Transform::Rotate270 => (true, j, true),
            Transform::FlipHorizontal => (false, j, true),
            Transform::FlipVertical => (false, h - 1 - j, false),
            Transform::Transpose => (true, j, false),
            Transform::Transverse => (true, w - 1 - j, true),
        };
        SourceLine {
            column,
            index,
            reversed,
        }
    }
}

impl Filter for Transform {
    fn bounds(&self, src: Rect) -> Rect {
        if self.swaps_axes() {
            Rect::from_size(src.height(), src.width())
        } else {
            Rect::from_size(src.width(), src.height())
        }
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        let srcb = src.bounds();
        let dstb = dst.bounds();
        let out = self.bounds(srcb);
        if out.is_empty() || dstb.is_empty() {
            return;
        }
        debug!(transform = ?self, %srcb, "exact transform");

        let (w, h) = (srcb.width(), srcb.height());
        let reader = src.reader();
        parallelize_rows(
            options.parallelization,
            dst.writer(),
            dstb.min_y,
            dstb.min_y + out.height(),
            |out, lo, hi| {
                let mut line = Vec::new();
                for y in lo..hi {
                    let l = self.line(y - dstb.min_y, w, h);
                    if l.column {
                        reader.column(srcb.min_x + l.index, &mut line);
                    } else {
                        reader.row(srcb.min_y + l.index, &mut line);
                    }
                    if l.reversed {
                        line.reverse();
                    }
                    out.set_row(y, &line);
                }
            },
        );
    }
}

// ============================================================================
// Rotation
// ============================================================================

/// Sampling used by [`Rotate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Nearest source pixel.
    #[default]
    Nearest,
    /// Bilinear over 2x2 pixels.
    Linear,
    /// Bicubic over 4x4 pixels.
    Cubic,
}

/// Rotates by `angle` degrees counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotate {
    /// Angle in degrees, counter-clockwise.
    pub angle: f32,
    /// Fill for areas not covered by the source.
    pub background: Pixel,
    /// Sampling method.
    pub interpolation: Interpolation,
}

impl Rotate {
    /// Creates a rotation filter.
    pub fn new(angle: f32, background: Pixel, interpolation: Interpolation) -> Self {
        Self {
            angle,
            background,
            interpolation,
        }
    }
}

#[inline]
fn sincos(angle: f32) -> (f32, f32) {
    let (s, c) = (std::f64::consts::PI * angle as f64 / 180.0).sin_cos();
    (s as f32, c as f32)
}

#[inline]
fn rotate_point(x: f32, y: f32, sin: f32, cos: f32) -> (f32, f32) {
    (x * cos - y * sin, x * sin + y * cos)
}

/// Size of the box enclosing a `w x h` image rotated by `angle` degrees.
///
/// The four corner pixel centres are rotated about the image centre. An
/// extent that is not within 0.01 of an integer grows by one pixel on each
/// side.
pub fn rotated_size(w: i32, h: i32, angle: f32) -> (i32, i32) {
    if w <= 0 || h <= 0 {
        return (0, 0);
    }
    let xoff = w as f32 / 2.0 - 0.5;
    let yoff = h as f32 / 2.0 - 0.5;
    let (sin, cos) = sincos(angle);

    let corners = [
        rotate_point(-xoff, -yoff, sin, cos),
        rotate_point((w - 1) as f32 - xoff, -yoff, sin, cos),
        rotate_point((w - 1) as f32 - xoff, (h - 1) as f32 - yoff, sin, cos),
        rotate_point(-xoff, (h - 1) as f32 - yoff, sin, cos),
    ];
    let (mut minx, mut maxx) = (f32::MAX, f32::MIN);
    let (mut miny, mut maxy) = (f32::MAX, f32::MIN);
    for (x, y) in corners {
        minx = minx.min(x);
        maxx = maxx.max(x);
        miny = miny.min(y);
        maxy = maxy.max(y);
    }

    let pad = |extent: f32| {
        if extent - extent.floor() > 0.01 {
            extent + 2.0
        } else {
            extent
        }
    };
    (pad(maxx - minx + 1.0) as i32, pad(maxy - miny + 1.0) as i32)
}

/// Distance from the top-left corner of a `w x h` image to the top-left
/// corner of the box produced by rotating it `angle` degrees.
///
/// Useful to place a rotated result back over the original. Angles are
/// taken modulo 360.
pub fn rotate_offset(w: i32, h: i32, angle: f32) -> (f32, f32) {
    if w <= 0 || h <= 0 {
        return (0.0, 0.0);
    }
    let xoff = w as f32 / 2.0 - 0.5;
    let yoff = h as f32 / 2.0 - 0.5;
    let (sin, cos) = sincos(angle);
    let (nx, ny) = rotate_point(-xoff, (h - 1) as f32 - yoff, sin, cos);

    let corners = [
        rotate_point(-xoff, -yoff, sin, cos),
        rotate_point((w - 1) as f32 - xoff, -yoff, sin, cos),
        rotate_point((w - 1) as f32 - xoff, (h - 1) as f32 - yoff, sin, cos),
        rotate_point(-xoff, (h - 1) as f32 - yoff, sin, cos),
    ];
    let minx = corners.iter().fold(f32::MAX, |m, c| m.min(c.0));
    let maxy = corners.iter().fold(f32::MIN, |m, c| m.max(c.1));

    let angle = angle.rem_euclid(360.0);
    if angle < 90.0 {
        (nx - minx, maxy - ny)
    } else if angle < 180.0 {
        ((nx - minx).abs(), maxy - ny)
    } else if angle < 270.0 {
        (nx - minx, (ny - maxy).abs())
    } else {
        (nx - minx, ny - maxy)
    }
}

fn interpolate_nearest(xf: f32, yf: f32, b: Rect, reader: &Reader<'_>, bg: Pixel) -> Pixel {
    let x0 = (xf + 0.5).floor() as i32;
    let y0 = (yf + 0.5).floor() as i32;
    if b.contains(x0, y0) {
        reader.pixel(x0, y0)
    } else {
        bg
    }
}

#[inline]
fn tap(b: Rect, reader: &Reader<'_>, bg: Pixel, x: i32, y: i32) -> Pixel {
    if b.contains(x, y) {
        reader.pixel(x, y)
    } else {
        bg
    }
}

#[inline]
fn weighted_sum(pxs: &[Pixel], cfs: &[f32]) -> Pixel {
    let mut acc = Pixel::TRANSPARENT;
    for (p, &c) in pxs.iter().zip(cfs) {
        let wa = p.a * c;
        acc.r += p.r * wa;
        acc.g += p.g * wa;
        acc.b += p.b * wa;
        acc.a += wa;
    }
    if acc.a != 0.0 {
        acc.r /= acc.a;
        acc.g /= acc.a;
        acc.b /= acc.a;
    }
    acc
}

fn interpolate_linear(xf: f32, yf: f32, b: Rect, reader: &Reader<'_>, bg: Pixel) -> Pixel {
    let x0 = xf.floor() as i32;
    let y0 = yf.floor() as i32;
    if !Rect::new(b.min_x - 1, b.min_y - 1, b.max_x, b.max_y).contains(x0, y0) {
        return bg;
    }
    let xq = xf - x0 as f32;
    let yq = yf - y0 as f32;

    let mut pxs = [Pixel::TRANSPARENT; 4];
    for i in 0..2 {
        for j in 0..2 {
            pxs[i * 2 + j] = tap(b, reader, bg, x0 + j as i32, y0 + i as i32);
        }
    }
    let cfs = [
        (1.0 - xq) * (1.0 - yq),
        xq * (1.0 - yq),
        (1.0 - xq) * yq,
        xq * yq,
    ];
    weighted_sum(&pxs, &cfs)
}

/// Cubic convolution coefficients for fractional offsets `(xq, yq)`.
fn cubic_coefficients(xq: f32, yq: f32) -> [f32; 16] {
    const K04: f32 = 1.0 / 4.0;
    const K12: f32 = 1.0 / 12.0;
    const K36: f32 = 1.0 / 36.0;

    [
        K36 * xq * yq * (xq - 1.0) * (xq - 2.0) * (yq - 1.0) * (yq - 2.0),
        -K12 * yq * (xq - 1.0) * (xq - 2.0) * (xq + 1.0) * (yq - 1.0) * (yq - 2.0),
        K12 * xq * yq * (xq + 1.0) * (xq - 2.0) * (yq - 1.0) * (yq - 2.0),
        -K36 * xq * yq * (xq - 1.0) * (xq + 1.0) * (yq - 1.0) * (yq - 2.0),
        -K12 * xq * (xq - 1.0) * (xq - 2.0) * (yq - 1.0) * (yq - 2.0) * (yq + 1.0),
        K04 * (xq - 1.0) * (xq - 2.0) * (xq + 1.0) * (yq - 1.0) * (yq - 2.0) * (yq + 1.0),
        -K04 * xq * (xq + 1.0) * (xq - 2.0) * (yq - 1.0) * (yq - 2.0) * (yq + 1.0),
        K12 * xq * (xq - 1.0) * (xq + 1.0) * (yq - 1.0) * (yq - 2.0) * (yq + 1.0),
        K12 * xq * yq * (xq - 1.0) * (xq - 2.0) * (yq + 1.0) * (yq - 2.0),
        -K04 * yq * (xq - 1.0) * (xq - 2.0) * (xq + 1.0) * (yq + 1.0) * (yq - 2.0),
        K04 * xq * yq * (xq + 1.0) * (xq - 2.0) * (yq + 1.0) * (yq - 2.0),
        -K12 * xq * yq * (xq - 1.0) * (xq + 1.0) * (yq + 1.0) * (yq - 2.0),
        -K36 * xq * yq * (xq - 1.0) * (xq - 2.0) * (yq - 1.0) * (yq + 1.0),
        K12 * yq * (xq - 1.0) * (xq - 2.0) * (xq + 1.0) * (yq - 1.0) * (yq + 1.0),
        -K12 * xq * yq * (xq + 1.0) * (xq - 2.0) * (yq - 1.0) * (yq + 1.0),
        K36 * xq * yq * (xq - 1.0) * (xq + 1.0) * (yq - 1.0) * (yq + 1.0),
    ]
}

fn interpolate_cubic(xf: f32, yf: f32, b: Rect, reader: &Reader<'_>, bg: Pixel) -> Pixel {
    let x0 = xf.floor() as i32;
    let y0 = yf.floor() as i32;
    if !Rect::new(b.min_x - 1, b.min_y - 1, b.max_x, b.max_y).contains(x0, y0) {
        return bg;
    }
    let xq = xf - x0 as f32;
    let yq = yf - y0 as f32;

    let mut pxs = [Pixel::TRANSPARENT; 16];
    for i in 0..4 {
        for j in 0..4 {
            pxs[i * 4 + j] = tap(b, reader, bg, x0 + j as i32 - 1, y0 + i as i32 - 1);
        }
    }
    weighted_sum(&pxs, &cubic_coefficients(xq, yq))
}

impl Filter for Rotate {
    fn bounds(&self, src: Rect) -> Rect {
        let (w, h) = rotated_size(src.width(), src.height(), self.angle);
        Rect::from_size(w, h)
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        let srcb = src.bounds();
        let dstb = dst.bounds();
        let (w, h) = rotated_size(srcb.width(), srcb.height(), self.angle);
        if w <= 0 || h <= 0 {
            return;
        }
        debug!(angle = self.angle, w, h, interpolation = ?self.interpolation, "rotate");

        let srcxoff = srcb.width() as f32 / 2.0 - 0.5;
        let srcyoff = srcb.height() as f32 / 2.0 - 0.5;
        let dstxoff = w as f32 / 2.0 - 0.5;
        let dstyoff = h as f32 / 2.0 - 0.5;
        let (sin, cos) = sincos(self.angle);
        let bg = self.background;
        let sample = match self.interpolation {
            Interpolation::Nearest => interpolate_nearest,
            Interpolation::Linear => interpolate_linear,
            Interpolation::Cubic => interpolate_cubic,
        };

        let reader = src.reader();
        parallelize_rows(
            options.parallelization,
            dst.writer(),
            dstb.min_y,
            dstb.min_y + h,
            |out, lo, hi| {
                let mut buf = vec![Pixel::TRANSPARENT; w as usize];
                for y in lo..hi {
                    let yd = (y - dstb.min_y) as f32 - dstyoff;
                    for (x, p) in buf.iter_mut().enumerate() {
                        let (xf, yf) = rotate_point(x as f32 - dstxoff, yd, sin, cos);
                        let xf = srcb.min_x as f32 + xf + srcxoff;
                        let yf = srcb.min_y as f32 + yf + srcyoff;
                        *p = sample(xf, yf, srcb, &reader, bg);
                    }
                    out.set_row(y, &buf);
                }
            },
        );
    }
}

// ============================================================================
// Cropping
// ============================================================================

/// Cuts `rect` out of the source; the result starts at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crop {
    /// Region to keep, in source coordinates.
    pub rect: Rect,
}

impl Crop {
    /// Creates a crop filter.
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

impl Filter for Crop {
    fn bounds(&self, src: Rect) -> Rect {
        src.intersect(&self.rect).to_origin()
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        let full = src.bounds();
        let srcb = full.intersect(&self.rect);
        let dstb = dst.bounds();
        if srcb.is_empty() || dstb.is_empty() {
            return;
        }

        let skip = (srcb.min_x - full.min_x) as usize;
        let take = srcb.width() as usize;
        let reader = src.reader();
        parallelize_rows(
            options.parallelization,
            dst.writer(),
            dstb.min_y,
            dstb.min_y + srcb.height(),
            |out, lo, hi| {
                let mut line = Vec::with_capacity(full.width() as usize);
                for y in lo..hi {
                    reader.row(srcb.min_y + y - dstb.min_y, &mut line);
                    out.set_row(y, &line[skip..skip + take]);
                }
            },
        );
    }
}

/// Reference point used to place a crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Centre of the image.
    #[default]
    Center,
    /// Top-left corner.
    TopLeft,
    /// Middle of the top edge.
    Top,
    /// Top-right corner.
    TopRight,
    /// Middle of the left edge.
    Left,
    /// Middle of the right edge.
    Right,
    /// Bottom-left corner.
    BottomLeft,
    /// Middle of the bottom edge.
    Bottom,
    /// Bottom-right corner.
    BottomRight,
}

impl Anchor {
    /// Top-left corner of a `w x h` rectangle anchored inside `b`.
    pub fn point(&self, b: Rect, w: i32, h: i32) -> Point {
        let cx = b.min_x + (b.width() - w) / 2;
        let cy = b.min_y + (b.height() - h) / 2;
        let (x, y) = match self {
            Anchor::TopLeft => (b.min_x, b.min_y),
            Anchor::Top => (cx, b.min_y),
            Anchor::TopRight => (b.max_x - w, b.min_y),
            Anchor::Left => (b.min_x, cy),
            Anchor::Right => (b.max_x - w, cy),
            Anchor::BottomLeft => (b.min_x, b.max_y - h),
            Anchor::Bottom => (cx, b.max_y - h),
            Anchor::BottomRight => (b.max_x - w, b.max_y - h),
            Anchor::Center => (cx, cy),
        };
        Point::new(x, y)
    }
}

/// Crops to `width` x `height` around an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropToSize {
    /// Output width.
    pub width: i32,
    /// Output height.
    pub height: i32,
    /// Placement of the kept region.
    pub anchor: Anchor,
}

impl CropToSize {
    /// Creates a crop-to-size filter.
    pub fn new(width: i32, height: i32, anchor: Anchor) -> Self {
        Self {
            width,
            height,
            anchor,
        }
    }

    fn region(&self, src: Rect) -> Option<Rect> {
        if self.width <= 0 || self.height <= 0 {
            return None;
        }
        let pt = self.anchor.point(src, self.width, self.height);
        let r = Rect::from_size(self.width, self.height).translate(pt.x, pt.y);
        Some(src.intersect(&r))
    }
}

impl Filter for CropToSize {
    fn bounds(&self, src: Rect) -> Rect {
        self.region(src).map_or(Rect::EMPTY, |r| r.to_origin())
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        if let Some(r) = self.region(src.bounds()) {
            Crop::new(r).apply(dst, src, options);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filtra_core::{Raster, RasterFormat};

    const ALL: [Transform; 7] = [
        Transform::Rotate90,
        Transform::Rotate180,
        Transform::Rotate270,
        Transform::FlipHorizontal,
        Transform::FlipVertical,
        Transform::Transpose,
        Transform::Transverse,
    ];

    fn gray(bounds: Rect, pix: &[u8]) -> Raster {
        Raster::from_pix(RasterFormat::Gray8, bounds, pix.to_vec()).unwrap()
    }

    fn run(f: &dyn Filter, src: &Raster) -> Raster {
        let mut dst = Raster::new(RasterFormat::Gray8, f.bounds(src.bounds()));
        f.apply(&mut dst, src, &Options::default());
        dst
    }

    #[test]
    fn test_exact_transforms() {
        let src = gray(Rect::new(-1, -1, 3, 1), &[1, 2, 3, 4, 5, 6, 7, 8]);
        let cases: [(Transform, (i32, i32), [u8; 8]); 7] = [
            (Transform::Rotate90, (2, 4), [4, 8, 3, 7, 2, 6, 1, 5]),
            (Transform::Rotate180, (4, 2), [8, 7, 6, 5, 4, 3, 2, 1]),
            (Transform::Rotate270, (2, 4), [5, 1, 6, 2, 7, 3, 8, 4]),
            (Transform::FlipHorizontal, (4, 2), [4, 3, 2, 1, 8, 7, 6, 5]),
            (Transform::FlipVertical, (4, 2), [5, 6, 7, 8, 1, 2, 3, 4]),
            (Transform::Transpose, (2, 4), [1, 5, 2, 6, 3, 7, 4, 8]),
            (Transform::Transverse, (2, 4), [8, 4, 7, 3, 6, 2, 5, 1]),
        ];
        for (t, (w, h), want) in cases {
            let dst = run(&t, &src);
            assert_eq!(dst.bounds(), Rect::from_size(w, h), "{t:?}");
            assert_eq!(dst.pix(), &want, "{t:?}");
        }
    }

    #[test]
    fn test_line_matches_source_of() {
        let (w, h) = (5, 3);
        for t in ALL {
            let out = t.bounds(Rect::from_size(w, h));
            for j in 0..out.height() {
                let l = t.line(j, w, h);
                let len = out.width();
                for i in 0..len {
                    let k = if l.reversed { len - 1 - i } else { i };
                    let got = if l.column { (l.index, k) } else { (k, l.index) };
                    assert_eq!(got, t.source_of(i, j, w, h), "{t:?} ({i},{j})");
                }
            }
        }
    }

    #[test]
    fn test_rotated_size() {
        assert_eq!(rotated_size(0, 5, 30.0), (0, 0));
        assert_eq!(rotated_size(3, 3, -90.0), (3, 3));
        assert_eq!(rotated_size(4, 2, 90.0), (2, 4));
        assert_eq!(rotated_size(3, 3, 45.0), (5, 5));
        assert_eq!(rotated_size(5, 5, 45.0), (8, 8));
        assert_eq!(rotated_size(7, 3, 0.0), (7, 3));
        assert_eq!(rotated_size(7, 3, 360.0), (7, 3));
    }

    #[test]
    fn test_rotate_offset() {
        let near = |got: (f32, f32), want: (f32, f32)| {
            assert!(
                (got.0 - want.0).abs() < 1e-5 && (got.1 - want.1).abs() < 1e-5,
                "{got:?} != {want:?}"
            );
        };
        assert_eq!(rotate_offset(0, 2, 30.0), (0.0, 0.0));
        near(rotate_offset(3, 2, 0.0), (0.0, 0.0));
        near(rotate_offset(3, 2, 90.0), (0.0, 2.0));
        near(rotate_offset(3, 2, 180.0), (2.0, 1.0));
        near(rotate_offset(3, 2, 270.0), (1.0, 0.0));
        near(rotate_offset(3, 2, -90.0), (1.0, 0.0));
        near(rotate_offset(3, 2, 450.0), (0.0, 2.0));
    }

    #[test]
    fn test_rotate_degenerate() {
        let empty = Raster::new(RasterFormat::Gray8, Rect::EMPTY);
        let f = Rotate::new(90.0, Pixel::WHITE, Interpolation::Nearest);
        assert!(run(&f, &empty).bounds().is_empty());

        let one = gray(Rect::new(-1, -1, 0, 0), &[0x80]);
        assert_eq!(run(&f, &one).pix(), &[0x80]);
    }

    #[test]
    fn test_rotate_quarter() {
        let src = gray(
            Rect::new(-1, -1, 2, 2),
            &[0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70, 0x80, 0x90],
        );
        let want = [0x70, 0x40, 0x10, 0x80, 0x50, 0x20, 0x90, 0x60, 0x30];
        for interp in [Interpolation::Nearest, Interpolation::Linear] {
            let dst = run(&Rotate::new(-90.0, Pixel::WHITE, interp), &src);
            assert_eq!(dst.bounds(), Rect::from_size(3, 3));
            assert_eq!(dst.pix(), &want, "{interp:?}");
        }
    }

    #[test]
    fn test_rotate_45_nearest() {
        let src = gray(
            Rect::new(-1, -1, 2, 2),
            &[0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70, 0x80, 0x90],
        );
        let dst = run(&Rotate::new(45.0, Pixel::BLACK, Interpolation::Nearest), &src);
        assert_eq!(dst.bounds(), Rect::from_size(5, 5));
        #[rustfmt::skip]
        let want = [
            0x00, 0x00, 0x30, 0x00, 0x00,
            0x00, 0x20, 0x30, 0x60, 0x00,
            0x10, 0x10, 0x50, 0x90, 0x90,
            0x00, 0x40, 0x70, 0x80, 0x00,
            0x00, 0x00, 0x70, 0x00, 0x00,
        ];
        assert_eq!(dst.pix(), &want);
    }

    #[test]
    fn test_rotate_45_smooth() {
        let src = gray(Rect::new(-1, -1, 4, 4), &[0xff; 25]);
        #[rustfmt::skip]
        let linear = [
            0x00, 0x00, 0x00, 0x26, 0x26, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x2c, 0xe0, 0xe0, 0x2c, 0x00, 0x00,
            0x00, 0x2c, 0xe0, 0xff, 0xff, 0xe0, 0x2c, 0x00,
            0x26, 0xe0, 0xff, 0xff, 0xff, 0xff, 0xe0, 0x26,
            0x26, 0xe0, 0xff, 0xff, 0xff, 0xff, 0xe0, 0x26,
            0x00, 0x2c, 0xe0, 0xff, 0xff, 0xe0, 0x2c, 0x00,
            0x00, 0x00, 0x2c, 0xe0, 0xe0, 0x2c, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x26, 0x26, 0x00, 0x00, 0x00,
        ];
        #[rustfmt::skip]
        let cubic = [
            0x00, 0x00, 0x00, 0x23, 0x23, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x28, 0xf1, 0xf1, 0x28, 0x00, 0x00,
            0x00, 0x28, 0xe3, 0xff, 0xff, 0xe3, 0x28, 0x00,
            0x23, 0xf1, 0xff, 0xff, 0xff, 0xff, 0xf1, 0x23,
            0x23, 0xf1, 0xff, 0xff, 0xff, 0xff, 0xf1, 0x23,
            0x00, 0x28, 0xe3, 0xff, 0xff, 0xe3, 0x28, 0x00,
            0x00, 0x00, 0x28, 0xf1, 0xf1, 0x28, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x23, 0x23, 0x00, 0x00, 0x00,
        ];
        for (interp, want) in [(Interpolation::Linear, linear), (Interpolation::Cubic, cubic)] {
            let dst = run(&Rotate::new(45.0, Pixel::BLACK, interp), &src);
            assert_eq!(dst.bounds(), Rect::from_size(8, 8));
            for (got, want) in dst.pix().iter().zip(want) {
                assert!((*got as i32 - want as i32).abs() <= 1, "{interp:?}: {got} vs {want}");
            }
        }
    }

    #[test]
    fn test_crop() {
        let src = gray(
            Rect::new(-1, -1, 4, 2),
            &[
                0x00, 0x01, 0x02, 0x03, 0x04, //
                0x05, 0x06, 0x07, 0x08, 0x09, //
                0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
            ],
        );
        let f = Crop::new(Rect::new(1, 0, 6, 6));
        let dst = run(&f, &src);
        assert_eq!(dst.bounds(), Rect::from_size(3, 2));
        assert_eq!(dst.pix(), &[0x07, 0x08, 0x09, 0x0c, 0x0d, 0x0e]);

        let f = Crop::new(Rect::new(10, 10, 20, 20));
        assert!(run(&f, &src).bounds().is_empty());
    }

    #[test]
    fn test_anchor_points() {
        let b = Rect::new(-1, -1, 5, 3);
        let cases = [
            (Anchor::Center, Point::new(1, 0)),
            (Anchor::TopLeft, Point::new(-1, -1)),
            (Anchor::Top, Point::new(1, -1)),
            (Anchor::TopRight, Point::new(3, -1)),
            (Anchor::Left, Point::new(-1, 0)),
            (Anchor::Right, Point::new(3, 0)),
            (Anchor::BottomLeft, Point::new(-1, 1)),
            (Anchor::Bottom, Point::new(1, 1)),
            (Anchor::BottomRight, Point::new(3, 1)),
        ];
        for (a, want) in cases {
            assert_eq!(a.point(b, 2, 2), want, "{a:?}");
        }
    }

    #[test]
    fn test_crop_to_size() {
        let src = gray(
            Rect::new(-1, -1, 2, 2),
            &[1, 2, 3, 4, 5, 6, 7, 8, 9],
        );
        let cases = [
            (Anchor::TopLeft, vec![1, 2, 4, 5]),
            (Anchor::BottomRight, vec![5, 6, 8, 9]),
            (Anchor::Center, vec![1, 2, 4, 5]),
        ];
        for (a, want) in cases {
            let dst = run(&CropToSize::new(2, 2, a), &src);
            assert_eq!(dst.pix(), &want[..], "{a:?}");
        }
        let big = run(&CropToSize::new(10, 1, Anchor::Bottom), &src);
        assert_eq!(big.bounds(), Rect::from_size(3, 1));
        assert_eq!(big.pix(), &[7, 8, 9]);
        assert!(CropToSize::new(0, 3, Anchor::Center).bounds(src.bounds()).is_empty());
    }
}
