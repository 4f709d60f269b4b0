//! Per-channel and per-pixel colour filters.
//!
//! [`ColorFunc`] maps the red, green and blue channels through a scalar
//! function and keeps alpha. Large images are mapped through a lookup table
//! sized for the source's channel depth: 256 entries for 8-bit sources,
//! 65536 otherwise. The table is built only when it saves work, i.e. when the
//! image needs more than twice as many evaluations as the table has entries.

use std::fmt;
use std::sync::Arc;

use filtra_core::{Pixel, Rect, Source, Target};
use tracing::trace;

use crate::filter::{Filter, Options};
use crate::parallel::parallelize_rows;

type ChannelFn = Arc<dyn Fn(f32) -> f32 + Send + Sync>;
type PixelFn = Arc<dyn Fn(Pixel) -> Pixel + Send + Sync>;

/// Samples `f` at `v / (size - 1)` for `v` in `0..size`.
pub fn prepare_lut(size: usize, f: impl Fn(f32) -> f32) -> Vec<f32> {
    let q = 1.0 / (size.max(2) - 1) as f32;
    (0..size).map(|v| f(v as f32 * q)).collect()
}

/// Looks `u` up in a table built by [`prepare_lut`].
#[inline]
pub fn lut_lookup(lut: &[f32], u: f32) -> f32 {
    let n = lut.len().saturating_sub(1);
    let i = (u.clamp(0.0, 1.0) * n as f32 + 0.5) as usize;
    lut[i.min(n)]
}

/// Filter applying a scalar function to each colour channel.
#[derive(Clone)]
pub struct ColorFunc {
    name: &'static str,
    func: ChannelFn,
}

impl fmt::Debug for ColorFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorFunc").field("name", &self.name).finish()
    }
}

impl ColorFunc {
    /// Wraps an arbitrary channel function.
    pub fn new(func: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Self::named("custom", func)
    }

    fn named(name: &'static str, func: impl Fn(f32) -> f32 + Send + Sync + 'static) -> Self {
        Self {
            name,
            func: Arc::new(func),
        }
    }

    /// Short name of the function, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Evaluates the channel function.
    #[inline]
    pub fn eval(&self, v: f32) -> f32 {
        (self.func)(v)
    }

    /// Negates colours: `1 - v`.
    pub fn invert() -> Self {
        Self::named("invert", |v| 1.0 - v)
    }

    /// Gamma correction with exponent `1 / gamma`.
    ///
    /// `gamma < 1` darkens, `gamma > 1` lightens; values below 0.0001 are
    /// raised to it.
    pub fn gamma(gamma: f32) -> Self {
        let e = 1.0 / (gamma as f64).max(0.0001);
        Self::named("gamma", move |v| (v as f64).powf(e) as f32)
    }

    /// sRGB transfer curve to linear light.
    pub fn srgb_to_linear() -> Self {
        Self::named("srgb_to_linear", |v| {
            if v <= 0.04045 {
                v / 12.92
            } else {
                (((v + 0.055) / 1.055) as f64).powf(2.4) as f32
            }
        })
    }

    /// Linear light to the sRGB transfer curve.
    pub fn linear_to_srgb() -> Self {
        Self::named("linear_to_srgb", |v| {
            if v <= 0.003_130_8 {
                v * 12.92
            } else {
                (1.055 * (v as f64).powf(1.0 / 2.4) - 0.055) as f32
            }
        })
    }
}

impl Filter for ColorFunc {
    fn bounds(&self, src: Rect) -> Rect {
        src.to_origin()
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        let srcb = src.bounds();
        let dstb = dst.bounds();
        if srcb.is_empty() {
            return;
        }

        let reader = src.reader();
        let lut_size = if reader.format().channel_depth() <= 8 {
            1 << 8
        } else {
            1 << 16
        };
        let lut = (srcb.area() * 3 > lut_size * 2).then(|| prepare_lut(lut_size, |v| self.eval(v)));
        trace!(func = self.name, lut = lut.as_ref().map(Vec::len), "color map");

        parallelize_rows(
            options.parallelization,
            dst.writer(),
            dstb.min_y,
            dstb.min_y + srcb.height(),
            |out, lo, hi| {
                let mut line = Vec::with_capacity(srcb.width() as usize);
                for y in lo..hi {
                    reader.row(srcb.min_y + y - dstb.min_y, &mut line);
                    match &lut {
                        Some(lut) => line
                            .iter_mut()
                            .for_each(|p| *p = p.map_rgb(|v| lut_lookup(lut, v))),
                        None => line.iter_mut().for_each(|p| *p = p.map_rgb(|v| self.eval(v))),
                    }
                    out.set_row(y, &line);
                }
            },
        );
    }
}

/// Filter applying a function to whole pixels.
#[derive(Clone)]
pub struct PixelFunc {
    func: PixelFn,
}

impl fmt::Debug for PixelFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelFunc").finish_non_exhaustive()
    }
}

impl PixelFunc {
    /// Wraps a pixel function. It receives non-premultiplied pixels.
    pub fn new(func: impl Fn(Pixel) -> Pixel + Send + Sync + 'static) -> Self {
        Self {
            func: Arc::new(func),
        }
    }
}

impl Filter for PixelFunc {
    fn bounds(&self, src: Rect) -> Rect {
        src.to_origin()
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        let srcb = src.bounds();
        let dstb = dst.bounds();
        if srcb.is_empty() {
            return;
        }

        let reader = src.reader();
        parallelize_rows(
            options.parallelization,
            dst.writer(),
            dstb.min_y,
            dstb.min_y + srcb.height(),
            |out, lo, hi| {
                let mut line = Vec::with_capacity(srcb.width() as usize);
                for y in lo..hi {
                    reader.row(srcb.min_y + y - dstb.min_y, &mut line);
                    for p in &mut line {
                        *p = (self.func)(*p);
                    }
                    out.set_row(y, &line);
                }
            },
        );
    }
}
