//! The filter capability set and shared helpers.
//!
//! A [`Filter`] is an immutable value object: it reports the output bounds
//! for a given input rectangle and draws into a destination. Filters hold no
//! mutable state and may be applied concurrently to different image pairs.

use filtra_core::{Raster, RasterFormat, Rect, Source, Target};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::parallel::parallelize_rows;

/// Execution options consumed by every filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Run pixel loops on the worker pool. Default: `true`.
    pub parallelization: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            parallelization: true,
        }
    }
}

/// An image filter.
///
/// # Example
///
/// ```rust
/// use filtra_core::{Raster, RasterFormat, Rect, Source, Target};
/// use filtra_ops::{Filter, Options, Transform};
///
/// let src = Raster::new(RasterFormat::Rgba8, Rect::new(-1, -1, 3, 1));
/// let f = Transform::Rotate90;
/// let mut dst = Raster::new(RasterFormat::Rgba8, f.bounds(src.bounds()));
/// assert_eq!(dst.bounds(), Rect::new(0, 0, 2, 4));
/// f.apply(&mut dst, &src, &Options::default());
/// ```
pub trait Filter: Send + Sync {
    /// Output rectangle for a source covering `src`.
    ///
    /// Depends only on the size of `src`, never on pixel contents.
    fn bounds(&self, src: Rect) -> Rect;

    /// Draws the filtered `src` into `dst`.
    ///
    /// The result is placed at `dst.bounds().min`; anything falling outside
    /// the destination is dropped.
    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options);
}

impl<F: Filter + ?Sized> Filter for Box<F> {
    fn bounds(&self, src: Rect) -> Rect {
        (**self).bounds(src)
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        (**self).apply(dst, src, options)
    }
}

/// Allocates an intermediate image (16 bits per channel, non-premultiplied).
#[inline]
pub fn temp_image(bounds: Rect) -> Raster {
    Raster::new(RasterFormat::Rgba16, bounds)
}

/// Copies `src` into `dst`, aligning both minimum corners.
pub fn copy_image(dst: &mut dyn Target, src: &dyn Source, options: &Options) {
    let srcb = src.bounds();
    let dstb = dst.bounds();
    if srcb.is_empty() || dstb.is_empty() {
        return;
    }
    trace!(%srcb, %dstb, "copy_image");

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
                out.set_row(y, &line);
            }
        },
    );
}

/// The identity filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyImage;

impl Filter for CopyImage {
    fn bounds(&self, src: Rect) -> Rect {
        src.to_origin()
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        copy_image(dst, src, options);
    }
}
