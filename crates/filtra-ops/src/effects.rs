//! Stylisation effects.

use filtra_core::{Pixel, Rect, Source, Target};
use tracing::debug;

use crate::filter::{copy_image, Filter, Options};
use crate::parallel::parallelize_rows;

/// Replaces each `size x size` block with its mean colour.
///
/// Blocks are aligned to the source's minimum corner; blocks on the right
/// and bottom edges may be smaller. The mean is unweighted, alpha included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixelate {
    /// Block side in pixels; `<= 1` copies the image.
    pub size: i32,
}

impl Pixelate {
    /// Creates a pixelate filter.
    pub fn new(size: i32) -> Self {
        Self { size }
    }
}

/// Mean colour of every block in one block row.
fn block_row_means(reader: &filtra_core::Reader<'_>, srcb: Rect, size: i32, by: i32) -> Vec<Pixel> {
    let nx = srcb.width() / size + i32::from(srcb.width() % size > 0);
    let mut sums = vec![Pixel::TRANSPARENT; nx as usize];
    let mut counts = vec![0u32; nx as usize];

    let y0 = srcb.min_y + by * size;
    let y1 = y0.saturating_add(size).min(srcb.max_y);
    let mut line = Vec::with_capacity(srcb.width() as usize);
    for sy in y0..y1 {
        reader.row(sy, &mut line);
        for (i, p) in line.iter().enumerate() {
            let bx = i / size as usize;
            sums[bx] = sums[bx] + *p;
            counts[bx] += 1;
        }
    }
    sums.iter()
        .zip(&counts)
        .map(|(&s, &n)| if n > 0 { s * (1.0 / n as f32) } else { s })
        .collect()
}

impl Filter for Pixelate {
    fn bounds(&self, src: Rect) -> Rect {
        src.to_origin()
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        let srcb = src.bounds();
        let dstb = dst.bounds();
        // a block never needs to be larger than the image
        let size = self.size.min(srcb.width().max(srcb.height()));
        if size <= 1 {
            copy_image(dst, src, options);
            return;
        }
        debug!(size, "pixelate");

        let reader = src.reader();
        parallelize_rows(
            options.parallelization,
            dst.writer(),
            dstb.min_y,
            dstb.min_y + srcb.height(),
            |out, lo, hi| {
                let mut current = None;
                let mut means = Vec::new();
                let mut buf = vec![Pixel::TRANSPARENT; srcb.width() as usize];
                for y in lo..hi {
                    let by = (y - dstb.min_y) / size;
                    if current != Some(by) {
                        means = block_row_means(&reader, srcb, size, by);
                        current = Some(by);
                    }
                    for (i, p) in buf.iter_mut().enumerate() {
                        *p = means[i / size as usize];
                    }
                    out.set_row(y, &buf);
                }
            },
        );
    }
}
