//! Image resizing with separable resampling kernels.
//!
//! # Kernels
//!
//! - [`Resampling::Nearest`] - Direct source pixel lookup, no weighting
//! - [`Resampling::Box`] - Flat average over the footprint
//! - [`Resampling::Linear`] - Triangle kernel
//! - [`Resampling::Cubic`] - Catmull-Rom (`B = 0`, `C = 0.5`)
//! - [`Resampling::Lanczos`] - Three-lobe windowed sinc
//!
//! # Algorithm
//!
//! A [`WeightTable`] is built once per axis. Downscaling widens the kernel
//! footprint by the scale factor, so every source pixel contributes. Lines are
//! accumulated alpha-weighted, so a transparent pixel never bleeds its colour
//! into its neighbours.
//!
//! 2-D resizes run a horizontal pass into a 16-bit temporary and a vertical
//! pass into the destination. Both passes iterate destination rows.
//!
//! # Example
//!
//! ```rust
//! use filtra_core::{Raster, RasterFormat, Rect, Source};
//! use filtra_ops::{Filter, Options, Resampling, Resize};
//!
//! let src = Raster::new(RasterFormat::Rgba8, Rect::from_size(640, 480));
//! let f = Resize::new(320, 0, Resampling::Lanczos);
//! let mut dst = Raster::new(RasterFormat::Rgba8, f.bounds(src.bounds()));
//! assert_eq!(dst.bounds(), Rect::from_size(320, 240));
//! f.apply(&mut dst, &src, &Options::default());
//! ```

use filtra_core::{Pixel, Rect, Source, Target};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::filter::{copy_image, temp_image, Filter, Options};
use crate::parallel::parallelize_rows;
use crate::transform::{Anchor, CropToSize};

/// Resampling kernel used by resizing filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resampling {
    /// Nearest neighbour (support 0).
    Nearest,
    /// Box average (support 0.5).
    Box,
    /// Bilinear triangle (support 1).
    Linear,
    /// Catmull-Rom cubic (support 2).
    Cubic,
    /// Lanczos, 3 lobes (support 3).
    #[default]
    Lanczos,
}

impl Resampling {
    /// Distance beyond which the kernel is zero.
    #[inline]
    pub fn support(&self) -> f32 {
        match self {
            Resampling::Nearest => 0.0,
            Resampling::Box => 0.5,
            Resampling::Linear => 1.0,
            Resampling::Cubic => 2.0,
            Resampling::Lanczos => 3.0,
        }
    }

    /// Kernel value at signed distance `x`.
    #[inline]
    pub fn kernel(&self, x: f32) -> f32 {
        let x = x.abs();
        match self {
            Resampling::Nearest => 0.0,
            Resampling::Box => {
                if x <= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Resampling::Linear => {
                if x < 1.0 {
                    1.0 - x
                } else {
                    0.0
                }
            }
            Resampling::Cubic => {
                if x < 2.0 {
                    bc_spline(x, 0.0, 0.5)
                } else {
                    0.0
                }
            }
            Resampling::Lanczos => {
                if x < 3.0 {
                    sinc(x) * sinc(x / 3.0)
                } else {
                    0.0
                }
            }
        }
    }
}

/// Two-parameter cubic spline (Mitchell-Netravali family).
pub fn bc_spline(x: f32, b: f32, c: f32) -> f32 {
    let x = x.abs();
    if x < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * x * x * x
            + (-18.0 + 12.0 * b + 6.0 * c) * x * x
            + (6.0 - 2.0 * b))
            / 6.0
    } else if x < 2.0 {
        ((-b - 6.0 * c) * x * x * x
            + (6.0 * b + 30.0 * c) * x * x
            + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

/// Normalized sinc, `sin(pi x) / (pi x)` with `sinc(0) = 1`.
pub fn sinc(x: f32) -> f32 {
    if x == 0.0 {
        return 1.0;
    }
    let px = std::f64::consts::PI * x as f64;
    (px.sin() / px) as f32
}

// ============================================================================
// Weight table
// ============================================================================

/// Per-destination-index source weights along one axis.
///
/// Entry `i` lists `(source index, weight)` pairs in ascending source order;
/// the weights of every non-empty entry sum to 1.
#[derive(Debug, Clone)]
pub struct WeightTable {
    starts: Vec<usize>,
    taps: Vec<(usize, f32)>,
}

impl WeightTable {
    /// Builds the table mapping `src_size` samples onto `dst_size`.
    pub fn new(dst_size: usize, src_size: usize, resampling: Resampling) -> Self {
        let mut starts = Vec::with_capacity(dst_size + 1);
        starts.push(0);
        if dst_size == 0 || src_size == 0 {
            starts.resize(dst_size + 1, 0);
            return Self {
                starts,
                taps: Vec::new(),
            };
        }

        let delta = src_size as f32 / dst_size as f32;
        let scale = delta.max(1.0);
        let radius = (scale * resampling.support()).ceil();
        let mut taps = Vec::with_capacity(dst_size * (radius as usize + 2) * 2);

        for i in 0..dst_size {
            let center = (i as f32 + 0.5) * delta - 0.5;
            let left = ((center - radius).ceil() as i64).max(0) as usize;
            let right = ((center + radius).floor() as i64).min(src_size as i64 - 1);

            let first = taps.len();
            let mut sum = 0.0f32;
            if right >= left as i64 {
                for j in left..=right as usize {
                    let w = resampling.kernel((j as f32 - center) / scale);
                    if w == 0.0 {
                        continue;
                    }
                    taps.push((j, w));
                    sum += w;
                }
            }
            if sum != 0.0 {
                for t in &mut taps[first..] {
                    t.1 /= sum;
                }
            }
            starts.push(taps.len());
        }

        trace!(dst_size, src_size, ?resampling, taps = taps.len(), "weight table");
        Self { starts, taps }
    }

    /// Number of destination indices.
    #[inline]
    pub fn len(&self) -> usize {
        self.starts.len() - 1
    }

    /// True for a table with no destination indices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Weights of destination index `i`.
    #[inline]
    pub fn get(&self, i: usize) -> &[(usize, f32)] {
        &self.taps[self.starts[i]..self.starts[i + 1]]
    }
}

/// Resamples `src` into `dst` (one output per table entry).
///
/// Colour is accumulated weighted by alpha and divided by the accumulated
/// alpha when it is non-zero; the output alpha is the accumulated alpha.
pub fn resample_line(dst: &mut [Pixel], src: &[Pixel], table: &WeightTable) {
    for (i, out) in dst.iter_mut().enumerate().take(table.len()) {
        let mut acc = Pixel::TRANSPARENT;
        for &(j, w) in table.get(i) {
            let c = src[j];
            let wa = c.a * w;
            acc.r += c.r * wa;
            acc.g += c.g * wa;
            acc.b += c.b * wa;
            acc.a += wa;
        }
        *out = unweight(acc);
    }
}

#[inline]
pub(crate) fn accumulate(acc: &mut [Pixel], line: &[Pixel], w: f32) {
    for (a, c) in acc.iter_mut().zip(line) {
        let wa = c.a * w;
        a.r += c.r * wa;
        a.g += c.g * wa;
        a.b += c.b * wa;
        a.a += wa;
    }
}

#[inline]
pub(crate) fn unweight(mut p: Pixel) -> Pixel {
    if p.a != 0.0 {
        p.r /= p.a;
        p.g /= p.a;
        p.b /= p.a;
    }
    p
}

// ============================================================================
// Passes
// ============================================================================

fn resize_horizontal(
    dst: &mut dyn Target,
    src: &dyn Source,
    w: i32,
    resampling: Resampling,
    options: &Options,
) {
    let srcb = src.bounds();
    let dstb = dst.bounds();
    let table = WeightTable::new(w as usize, srcb.width() as usize, resampling);
    debug!(from = srcb.width(), to = w, ?resampling, "resize horizontal pass");

    let reader = src.reader();
    parallelize_rows(
        options.parallelization,
        dst.writer(),
        dstb.min_y,
        dstb.min_y + srcb.height(),
        |out, lo, hi| {
            let mut src_buf = Vec::with_capacity(srcb.width() as usize);
            let mut dst_buf = vec![Pixel::TRANSPARENT; w as usize];
            for y in lo..hi {
                reader.row(srcb.min_y + y - dstb.min_y, &mut src_buf);
                resample_line(&mut dst_buf, &src_buf, &table);
                out.set_row(y, &dst_buf);
            }
        },
    );
}

fn resize_vertical(
    dst: &mut dyn Target,
    src: &dyn Source,
    h: i32,
    resampling: Resampling,
    options: &Options,
) {
    let srcb = src.bounds();
    let dstb = dst.bounds();
    let table = WeightTable::new(h as usize, srcb.height() as usize, resampling);
    debug!(from = srcb.height(), to = h, ?resampling, "resize vertical pass");

    let reader = src.reader();
    let width = srcb.width() as usize;
    parallelize_rows(
        options.parallelization,
        dst.writer(),
        dstb.min_y,
        dstb.min_y + h,
        |out, lo, hi| {
            let mut line = Vec::with_capacity(width);
            let mut acc = vec![Pixel::TRANSPARENT; width];
            for y in lo..hi {
                acc.fill(Pixel::TRANSPARENT);
                for &(j, w) in table.get((y - dstb.min_y) as usize) {
                    reader.row(srcb.min_y + j as i32, &mut line);
                    accumulate(&mut acc, &line, w);
                }
                for p in &mut acc {
                    *p = unweight(*p);
                }
                out.set_row(y, &acc);
            }
        },
    );
}

fn resize_nearest(dst: &mut dyn Target, src: &dyn Source, w: i32, h: i32, options: &Options) {
    let srcb = src.bounds();
    let dstb = dst.bounds();
    let dx = srcb.width() as f64 / w as f64;
    let dy = srcb.height() as f64 / h as f64;
    debug!(w, h, "resize nearest");

    let xs: Vec<i32> = (0..w)
        .map(|i| srcb.min_x + ((i as f64 + 0.5) * dx).floor() as i32)
        .collect();
    let reader = src.reader();
    parallelize_rows(
        options.parallelization,
        dst.writer(),
        dstb.min_y,
        dstb.min_y + h,
        |out, lo, hi| {
            let mut buf = vec![Pixel::TRANSPARENT; w as usize];
            for y in lo..hi {
                let sy = srcb.min_y + (((y - dstb.min_y) as f64 + 0.5) * dy).floor() as i32;
                for (p, &sx) in buf.iter_mut().zip(&xs) {
                    *p = reader.pixel(sx, sy);
                }
                out.set_row(y, &buf);
            }
        },
    );
}

// ============================================================================
// Filters
// ============================================================================

/// Resizes to `width` x `height`.
///
/// A zero dimension is derived from the other one, preserving the aspect
/// ratio. Both zero, or a negative dimension, gives an empty result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resize {
    /// Target width, or 0 to preserve the aspect ratio.
    pub width: i32,
    /// Target height, or 0 to preserve the aspect ratio.
    pub height: i32,
    /// Resampling kernel.
    pub resampling: Resampling,
}

impl Resize {
    /// Creates a resize filter.
    pub fn new(width: i32, height: i32, resampling: Resampling) -> Self {
        Self {
            width,
            height,
            resampling,
        }
    }
}

impl Filter for Resize {
    fn bounds(&self, src: Rect) -> Rect {
        let (w, h) = (self.width, self.height);
        let (srcw, srch) = (src.width(), src.height());

        if (w == 0 && h == 0) || w < 0 || h < 0 || srcw <= 0 || srch <= 0 {
            Rect::EMPTY
        } else if w == 0 {
            let fw = h as f64 * srcw as f64 / srch as f64;
            Rect::from_size((fw + 0.5).floor().max(1.0) as i32, h)
        } else if h == 0 {
            let fh = w as f64 * srch as f64 / srcw as f64;
            Rect::from_size(w, (fh + 0.5).floor().max(1.0) as i32)
        } else {
            Rect::from_size(w, h)
        }
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        let srcb = src.bounds();
        let b = self.bounds(srcb);
        let (w, h) = (b.width(), b.height());
        if w <= 0 || h <= 0 {
            return;
        }

        if srcb.width() == w && srcb.height() == h {
            copy_image(dst, src, options);
        } else if self.resampling.support() <= 0.0 {
            resize_nearest(dst, src, w, h, options);
        } else if srcb.width() == w {
            resize_vertical(dst, src, h, self.resampling, options);
        } else if srcb.height() == h {
            resize_horizontal(dst, src, w, self.resampling, options);
        } else {
            let mut tmp = temp_image(Rect::from_size(w, srcb.height()));
            resize_horizontal(&mut tmp, src, w, self.resampling, options);
            resize_vertical(dst, &tmp, h, self.resampling, options);
        }
    }
}

/// Shrinks to fit inside `width` x `height`, preserving the aspect ratio.
///
/// Sources already fitting in the box keep their size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeToFit {
    /// Box width.
    pub width: i32,
    /// Box height.
    pub height: i32,
    /// Resampling kernel.
    pub resampling: Resampling,
}

impl ResizeToFit {
    /// Creates a resize-to-fit filter.
    pub fn new(width: i32, height: i32, resampling: Resampling) -> Self {
        Self {
            width,
            height,
            resampling,
        }
    }
}

impl Filter for ResizeToFit {
    fn bounds(&self, src: Rect) -> Rect {
        let (w, h) = (self.width, self.height);
        let (srcw, srch) = (src.width(), src.height());

        if w <= 0 || h <= 0 || srcw <= 0 || srch <= 0 {
            return Rect::EMPTY;
        }
        if srcw <= w && srch <= h {
            return Rect::from_size(srcw, srch);
        }

        let wratio = srcw as f64 / w as f64;
        let hratio = srch as f64 / h as f64;
        if wratio > hratio {
            Rect::from_size(w, ((srch as f64 / wratio + 0.5) as i32).min(h))
        } else {
            Rect::from_size(((srcw as f64 / hratio + 0.5) as i32).min(w), h)
        }
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        let b = self.bounds(src.bounds());
        Resize::new(b.width(), b.height(), self.resampling).apply(dst, src, options);
    }
}

/// Resizes to the smallest size covering `width` x `height`, then crops to
/// exactly that size around `anchor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeToFill {
    /// Output width.
    pub width: i32,
    /// Output height.
    pub height: i32,
    /// Resampling kernel.
    pub resampling: Resampling,
    /// Part of the resized image that is kept.
    pub anchor: Anchor,
}

impl ResizeToFill {
    /// Creates a resize-to-fill filter.
    pub fn new(width: i32, height: i32, resampling: Resampling, anchor: Anchor) -> Self {
        Self {
            width,
            height,
            resampling,
            anchor,
        }
    }
}

impl Filter for ResizeToFill {
    fn bounds(&self, src: Rect) -> Rect {
        if self.width <= 0 || self.height <= 0 || src.is_empty() {
            return Rect::EMPTY;
        }
        Rect::from_size(self.width, self.height)
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        let b = self.bounds(src.bounds());
        let (w, h) = (b.width(), b.height());
        if w <= 0 || h <= 0 {
            return;
        }

        let srcb = src.bounds();
        let wratio = srcb.width() as f64 / w as f64;
        let hratio = srcb.height() as f64 / h as f64;
        let (tmpw, tmph) = if wratio < hratio {
            (w, ((srcb.height() as f64 / wratio + 0.5) as i32).max(h))
        } else {
            (((srcb.width() as f64 / hratio + 0.5) as i32).max(w), h)
        };

        let mut tmp = temp_image(Rect::from_size(tmpw, tmph));
        Resize::new(tmpw, tmph, self.resampling).apply(&mut tmp, src, options);
        CropToSize::new(w, h, self.anchor).apply(dst, &tmp, options);
    }
}
