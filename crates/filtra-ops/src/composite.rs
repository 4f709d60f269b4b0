//! Porter-Duff compositing.
//!
//! Pixels are non-premultiplied, so [`over`] premultiplies on the fly and
//! divides the result by the output alpha.
//!
//! # Example
//!
//! ```rust
//! use filtra_core::Pixel;
//! use filtra_ops::composite::over;
//!
//! let bg = Pixel::new(0.0, 0.0, 1.0, 1.0); // opaque blue
//! let fg = Pixel::new(1.0, 0.0, 0.0, 0.5); // half red
//! let out = over(bg, fg);
//! assert_eq!(out.a, 1.0);
//! assert!((out.r - 0.5).abs() < 1e-6 && (out.b - 0.5).abs() < 1e-6);
//! ```

use filtra_core::{Pixel, Source, Target};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::filter::Options;
use crate::parallel::parallelize_rows;

/// How a rendered result is combined with the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Replace destination pixels.
    #[default]
    Copy,
    /// Composite over destination pixels.
    Over,
}

/// `src` over `dst`.
///
/// `out_a = src_a + dst_a (1 - src_a)`; colours are blended with their
/// alphas and divided by `out_a`. A fully transparent result is
/// [`Pixel::TRANSPARENT`].
#[inline]
pub fn over(dst: Pixel, src: Pixel) -> Pixel {
    let inv = 1.0 - src.a;
    let a = src.a + dst.a * inv;
    if a == 0.0 {
        return Pixel::TRANSPARENT;
    }
    let da = dst.a * inv;
    Pixel::new(
        (dst.r * da + src.r * src.a) / a,
        (dst.g * da + src.g * src.a) / a,
        (dst.b * da + src.b * src.a) / a,
        a,
    )
}

/// Combines `src` into `dst` where their bounds overlap.
///
/// Both images are addressed in the same coordinate space; nothing is
/// translated.
pub fn draw(dst: &mut dyn Target, src: &dyn Source, operator: Operator, options: &Options) {
    let srcb = src.bounds();
    let area = dst.bounds().intersect(&srcb);
    if area.is_empty() {
        return;
    }
    trace!(%area, ?operator, "composite");

    let reader = src.reader();
    let skip = (area.min_x - srcb.min_x) as usize;
    let take = area.width() as usize;
    parallelize_rows(
        options.parallelization,
        dst.writer(),
        area.min_y,
        area.max_y,
        |out, lo, hi| {
            let mut line = Vec::with_capacity(srcb.width() as usize);
            for y in lo..hi {
                reader.row(y, &mut line);
                let line = &mut line[skip..skip + take];
                if operator == Operator::Over {
                    for (x, s) in (area.min_x..).zip(line.iter_mut()) {
                        *s = over(out.pixel(x, y), *s);
                    }
                }
                for (x, s) in (area.min_x..).zip(line.iter()) {
                    out.set_pixel(x, y, *s);
                }
            }
        },
    );
}
