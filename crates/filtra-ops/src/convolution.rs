//! Convolution filters.
//!
//! - [`Convolution`] - arbitrary square kernel
//! - [`GaussianBlur`] - separable gaussian, two 1-D passes
//! - [`UnsharpMask`] - sharpening against a gaussian blur
//! - [`Mean`] - local average over a square or disk
//! - [`Sobel`] - gradient magnitude
//!
//! Source coordinates are clamped to the image edges, so border pixels are
//! extended outward.

use filtra_core::{Pixel, Rect, Source, Target};
use tracing::{debug, trace};

use crate::filter::{copy_image, temp_image, Filter, Options};
use crate::parallel::parallelize_rows;
use crate::rank::gen_disk;
use crate::resize::{accumulate, unweight};

/// A non-zero kernel tap at offset `(u, v)` from the centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    /// Horizontal offset.
    pub u: i32,
    /// Vertical offset.
    pub v: i32,
    /// Weight.
    pub weight: f32,
}

/// Extracts the taps of a square kernel.
///
/// The kernel side is the largest odd integer not above `sqrt(kernel.len())`;
/// extra values are ignored and zero weights are dropped. Returns the side
/// and the taps.
///
/// With `normalize`, weights are divided by their sum, or by the sum of the
/// positive weights when the total is zero. A kernel without positive
/// weights and a zero sum is left as is.
pub fn prepare_weights(kernel: &[f32], normalize: bool) -> (usize, Vec<Tap>) {
    let mut size = (kernel.len() as f64).sqrt() as usize;
    if size % 2 == 0 {
        size = size.saturating_sub(1);
    }
    if size < 1 {
        return (0, Vec::new());
    }
    let center = (size / 2) as i32;

    let mut taps = Vec::new();
    for i in 0..size {
        for j in 0..size {
            let w = kernel.get(j * size + i).copied().unwrap_or(0.0);
            if w != 0.0 {
                taps.push(Tap {
                    u: i as i32 - center,
                    v: j as i32 - center,
                    weight: w,
                });
            }
        }
    }
    if !normalize {
        return (size, taps);
    }

    let sum: f32 = taps.iter().map(|t| t.weight).sum();
    let positive: f32 = taps.iter().map(|t| t.weight.max(0.0)).sum();
    let div = if sum != 0.0 {
        sum
    } else if positive != 0.0 {
        positive
    } else {
        return (size, taps);
    };
    for t in &mut taps {
        t.weight /= div;
    }
    (size, taps)
}

/// Taps of a 1-D kernel as `(offset, weight)`; even lengths drop the last value.
pub(crate) fn prepare_weights_1d(kernel: &[f32]) -> Vec<(i32, f32)> {
    let size = if kernel.len() % 2 == 0 {
        kernel.len().saturating_sub(1)
    } else {
        kernel.len()
    };
    let center = (size / 2) as i32;
    kernel[..size]
        .iter()
        .enumerate()
        .filter(|(_, w)| **w != 0.0)
        .map(|(i, &w)| (i as i32 - center, w))
        .collect()
}

/// Alpha-weighted 1-D convolution of one line with edge clamping.
fn convolve_line(dst: &mut [Pixel], src: &[Pixel], taps: &[(i32, f32)]) {
    let Some(max) = src.len().checked_sub(1) else {
        return;
    };
    for (i, out) in dst.iter_mut().enumerate().take(src.len()) {
        let mut acc = Pixel::TRANSPARENT;
        for &(u, w) in taps {
            let k = (i as i64 + u as i64).clamp(0, max as i64) as usize;
            let c = src[k];
            let wa = c.a * w;
            acc.r += c.r * wa;
            acc.g += c.g * wa;
            acc.b += c.b * wa;
            acc.a += wa;
        }
        *out = unweight(acc);
    }
}

fn convolve_horizontal(dst: &mut dyn Target, src: &dyn Source, kernel: &[f32], options: &Options) {
    let srcb = src.bounds();
    let dstb = dst.bounds();
    if srcb.is_empty() {
        return;
    }
    if kernel.is_empty() {
        copy_image(dst, src, options);
        return;
    }
    let taps = prepare_weights_1d(kernel);

    let reader = src.reader();
    parallelize_rows(
        options.parallelization,
        dst.writer(),
        dstb.min_y,
        dstb.min_y + srcb.height(),
        |out, lo, hi| {
            let mut line = Vec::with_capacity(srcb.width() as usize);
            let mut buf = vec![Pixel::TRANSPARENT; srcb.width() as usize];
            for y in lo..hi {
                reader.row(srcb.min_y + y - dstb.min_y, &mut line);
                convolve_line(&mut buf, &line, &taps);
                out.set_row(y, &buf);
            }
        },
    );
}

fn convolve_vertical(dst: &mut dyn Target, src: &dyn Source, kernel: &[f32], options: &Options) {
    let srcb = src.bounds();
    let dstb = dst.bounds();
    if srcb.is_empty() {
        return;
    }
    if kernel.is_empty() {
        copy_image(dst, src, options);
        return;
    }
    let taps = prepare_weights_1d(kernel);

    let reader = src.reader();
    let width = srcb.width() as usize;
    parallelize_rows(
        options.parallelization,
        dst.writer(),
        dstb.min_y,
        dstb.min_y + srcb.height(),
        |out, lo, hi| {
            let mut line = Vec::with_capacity(width);
            let mut acc = vec![Pixel::TRANSPARENT; width];
            for y in lo..hi {
                let sy = srcb.min_y + y - dstb.min_y;
                acc.fill(Pixel::TRANSPARENT);
                for &(v, w) in &taps {
                    reader.row(srcb.clamp_y(sy + v), &mut line);
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

/// Square-kernel convolution.
///
/// ```rust
/// use filtra_ops::Convolution;
///
/// // emboss
/// let f = Convolution::new(vec![-1.0, -1.0, 0.0, -1.0, 1.0, 1.0, 0.0, 1.0, 1.0], false, false, false, 0.0);
/// assert_eq!(f.kernel.len(), 9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Convolution {
    /// Row-major kernel; its length should be the square of an odd size.
    pub kernel: Vec<f32>,
    /// Normalise weights before filtering.
    pub normalize: bool,
    /// Filter alpha too; otherwise alpha is copied from the centre pixel.
    pub alpha: bool,
    /// Take absolute channel values.
    pub abs: bool,
    /// Bias added to every filtered channel.
    pub delta: f32,
}

impl Convolution {
    /// Creates a convolution filter.
    pub fn new(kernel: Vec<f32>, normalize: bool, alpha: bool, abs: bool, delta: f32) -> Self {
        Self {
            kernel,
            normalize,
            alpha,
            abs,
            delta,
        }
    }
}

impl Filter for Convolution {
    fn bounds(&self, src: Rect) -> Rect {
        src.to_origin()
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        let srcb = src.bounds();
        let dstb = dst.bounds();
        if srcb.is_empty() {
            return;
        }
        let (ksize, taps) = prepare_weights(&self.kernel, self.normalize);
        if ksize < 1 {
            copy_image(dst, src, options);
            return;
        }
        trace!(ksize, taps = taps.len(), "convolution weights");

        let kcenter = (ksize / 2) as i32;
        let width = srcb.width() as usize;
        let reader = src.reader();
        parallelize_rows(
            options.parallelization,
            dst.writer(),
            dstb.min_y,
            dstb.min_y + srcb.height(),
            |out, lo, hi| {
                let first = srcb.min_y + lo - dstb.min_y;
                let mut rows: Vec<Vec<Pixel>> = (0..ksize as i32)
                    .map(|i| {
                        let mut row = Vec::with_capacity(width);
                        reader.row(srcb.clamp_y(first + i - kcenter), &mut row);
                        row
                    })
                    .collect();
                let mut buf = vec![Pixel::TRANSPARENT; width];

                for y in lo..hi {
                    for (dx, p) in buf.iter_mut().enumerate() {
                        let mut acc = Pixel::TRANSPARENT;
                        for t in &taps {
                            let sx = (dx as i32 + t.u).clamp(0, width as i32 - 1) as usize;
                            let px = rows[(kcenter + t.v) as usize][sx];
                            acc.r += px.r * t.weight;
                            acc.g += px.g * t.weight;
                            acc.b += px.b * t.weight;
                            if self.alpha {
                                acc.a += px.a * t.weight;
                            }
                        }
                        if self.abs {
                            acc.r = acc.r.abs();
                            acc.g = acc.g.abs();
                            acc.b = acc.b.abs();
                            if self.alpha {
                                acc.a = acc.a.abs();
                            }
                        }
                        if self.delta != 0.0 {
                            acc.r += self.delta;
                            acc.g += self.delta;
                            acc.b += self.delta;
                            if self.alpha {
                                acc.a += self.delta;
                            }
                        }
                        if !self.alpha {
                            acc.a = rows[kcenter as usize][dx].a;
                        }
                        *p = acc;
                    }
                    out.set_row(y, &buf);

                    if y + 1 < hi {
                        rows.rotate_left(1);
                        let next = srcb.min_y + y - dstb.min_y + kcenter + 1;
                        reader.row(srcb.clamp_y(next), &mut rows[ksize - 1]);
                    }
                }
            },
        );
    }
}

/// Normalised gaussian kernel of radius `ceil(3 sigma)`.
///
/// Returns an empty kernel for non-positive `sigma`.
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return Vec::new();
    }
    let g = |x: f32| {
        ((-(x * x) as f64 / (2.0 * sigma as f64 * sigma as f64)).exp()
            / (sigma as f64 * (2.0 * std::f64::consts::PI).sqrt())) as f32
    };
    let radius = (sigma as f64 * 3.0).ceil() as usize;
    let mut kernel = vec![0.0f32; 2 * radius + 1];
    kernel[radius] = g(0.0);
    let mut sum = kernel[radius];
    for i in 1..=radius {
        let f = g(i as f32);
        kernel[radius - i] = f;
        kernel[radius + i] = f;
        sum += 2.0 * f;
    }
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Gaussian blur with standard deviation `sigma` (radius about `3 sigma`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianBlur {
    /// Standard deviation in pixels; `<= 0` copies the image.
    pub sigma: f32,
}

impl GaussianBlur {
    /// Creates a gaussian blur.
    pub fn new(sigma: f32) -> Self {
        Self { sigma }
    }
}

impl Filter for GaussianBlur {
    fn bounds(&self, src: Rect) -> Rect {
        src.to_origin()
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        let srcb = src.bounds();
        if srcb.is_empty() {
            return;
        }
        if self.sigma <= 0.0 {
            copy_image(dst, src, options);
            return;
        }
        let kernel = gaussian_kernel(self.sigma);
        debug!(sigma = self.sigma, taps = kernel.len(), "gaussian blur");

        let mut tmp = temp_image(srcb);
        convolve_horizontal(&mut tmp, src, &kernel, options);
        convolve_vertical(dst, &tmp, &kernel, options);
    }
}

/// Sharpens by adding back the difference from a gaussian blur.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnsharpMask {
    /// Blur standard deviation.
    pub sigma: f32,
    /// Strength, typically 0.5 to 1.5.
    pub amount: f32,
    /// Minimum difference that gets sharpened, typically 0 to 0.05.
    pub threshold: f32,
}

impl UnsharpMask {
    /// Creates an unsharp mask.
    pub fn new(sigma: f32, amount: f32, threshold: f32) -> Self {
        Self {
            sigma,
            amount,
            threshold,
        }
    }
}

#[inline]
fn unsharp(orig: f32, blurred: f32, amount: f32, threshold: f32) -> f32 {
    let diff = (orig - blurred) * amount;
    if diff.abs() > threshold.abs() {
        orig + diff
    } else {
        orig
    }
}

impl Filter for UnsharpMask {
    fn bounds(&self, src: Rect) -> Rect {
        src.to_origin()
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        let srcb = src.bounds();
        let dstb = dst.bounds();
        if srcb.is_empty() {
            return;
        }

        let mut blurred = temp_image(srcb);
        GaussianBlur::new(self.sigma).apply(&mut blurred, src, options);

        let orig = src.reader();
        let blur = blurred.reader();
        parallelize_rows(
            options.parallelization,
            dst.writer(),
            dstb.min_y,
            dstb.min_y + srcb.height(),
            |out, lo, hi| {
                let mut a = Vec::with_capacity(srcb.width() as usize);
                let mut b = Vec::with_capacity(srcb.width() as usize);
                for y in lo..hi {
                    let sy = srcb.min_y + y - dstb.min_y;
                    orig.row(sy, &mut a);
                    blur.row(sy, &mut b);
                    for (o, bl) in a.iter_mut().zip(&b) {
                        *o = Pixel::new(
                            unsharp(o.r, bl.r, self.amount, self.threshold),
                            unsharp(o.g, bl.g, self.amount, self.threshold),
                            unsharp(o.b, bl.b, self.amount, self.threshold),
                            unsharp(o.a, bl.a, self.amount, self.threshold),
                        );
                    }
                    out.set_row(y, &a);
                }
            },
        );
    }
}

/// Local mean over a `ksize` square, or a disk inscribed in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mean {
    /// Neighbourhood size; even values are decremented.
    pub ksize: usize,
    /// Use a disk instead of a square.
    pub disk: bool,
}

impl Mean {
    /// Creates a mean filter.
    pub fn new(ksize: usize, disk: bool) -> Self {
        Self { ksize, disk }
    }
}

impl Filter for Mean {
    fn bounds(&self, src: Rect) -> Rect {
        src.to_origin()
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        if src.bounds().is_empty() {
            return;
        }
        let ksize = if self.ksize % 2 == 0 {
            self.ksize.saturating_sub(1)
        } else {
            self.ksize
        };
        if ksize <= 1 {
            copy_image(dst, src, options);
            return;
        }
        let kernel = if self.disk {
            gen_disk(self.ksize)
        } else {
            vec![1.0; ksize * ksize]
        };
        Convolution::new(kernel, true, true, false, 0.0).apply(dst, src, options);
    }
}

/// Sobel gradient magnitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sobel;

const SOBEL_H: [f32; 9] = [-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0];
const SOBEL_V: [f32; 9] = [-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0];

impl Filter for Sobel {
    fn bounds(&self, src: Rect) -> Rect {
        src.to_origin()
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        let srcb = src.bounds();
        let dstb = dst.bounds();
        if srcb.is_empty() {
            return;
        }

        let mut tmph = temp_image(srcb);
        Convolution::new(SOBEL_H.to_vec(), false, false, true, 0.0).apply(&mut tmph, src, options);
        let mut tmpv = temp_image(srcb);
        Convolution::new(SOBEL_V.to_vec(), false, false, true, 0.0).apply(&mut tmpv, src, options);

        let rh = tmph.reader();
        let rv = tmpv.reader();
        parallelize_rows(
            options.parallelization,
            dst.writer(),
            dstb.min_y,
            dstb.min_y + srcb.height(),
            |out, lo, hi| {
                let mut h = Vec::with_capacity(srcb.width() as usize);
                let mut v = Vec::with_capacity(srcb.width() as usize);
                for y in lo..hi {
                    let sy = srcb.min_y + y - dstb.min_y;
                    rh.row(sy, &mut h);
                    rv.row(sy, &mut v);
                    for (ph, pv) in h.iter_mut().zip(&v) {
                        *ph = Pixel::new(
                            ph.r.hypot(pv.r),
                            ph.g.hypot(pv.g),
                            ph.b.hypot(pv.b),
                            ph.a,
                        );
                    }
                    out.set_row(y, &h);
                }
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use filtra_core::{Raster, RasterFormat};

    fn gray(bounds: Rect, pix: &[u8]) -> Raster {
        Raster::from_pix(RasterFormat::Gray8, bounds, pix.to_vec()).unwrap()
    }

    fn run(f: &dyn Filter, src: &Raster) -> Raster {
        let mut dst = Raster::new(RasterFormat::Gray8, f.bounds(src.bounds()));
        f.apply(&mut dst, src, &Options::default());
        dst
    }

    #[test]
    fn test_prepare_weights_sizes() {
        assert_eq!(prepare_weights(&[], false).0, 0);
        assert_eq!(prepare_weights(&[1.0; 4], false).0, 1);
        assert_eq!(prepare_weights(&[1.0; 10], false).0, 3);
        assert_eq!(prepare_weights(&[1.0; 25], false).0, 5);

        let (size, taps) = prepare_weights(&[0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0], false);
        assert_eq!(size, 3);
        assert_eq!(
            taps,
            vec![
                Tap { u: 0, v: -1, weight: 2.0 },
                Tap { u: 1, v: 1, weight: 3.0 },
            ]
        );
    }

    #[test]
    fn test_prepare_weights_normalization() {
        let (_, taps) = prepare_weights(&[1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0], true);
        let sum: f32 = taps.iter().map(|t| t.weight).sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);

        // zero sum falls back to the positive sum
        let (_, taps) = prepare_weights(&SOBEL_H, true);
        let pos: f32 = taps.iter().map(|t| t.weight.max(0.0)).sum();
        assert_relative_eq!(pos, 1.0, epsilon = 1e-6);

        let (_, taps) = prepare_weights(&[-1.0; 9], true);
        assert!(taps.iter().all(|t| (t.weight - 1.0 / 9.0).abs() < 1e-6));

        let (size, taps) = prepare_weights(&[0.0; 9], true);
        assert_eq!(size, 3);
        assert!(taps.is_empty());
    }

    #[test]
    fn test_prepare_weights_1d() {
        assert_eq!(prepare_weights_1d(&[1.0, 2.0, 3.0]), vec![(-1, 1.0), (0, 2.0), (1, 3.0)]);
        assert_eq!(prepare_weights_1d(&[1.0, 0.0, 3.0, 9.0]), vec![(-1, 1.0), (1, 3.0)]);
        assert!(prepare_weights_1d(&[]).is_empty());
    }

    #[test]
    fn test_convolution_box_clamps_edges() {
        let src = gray(Rect::new(-1, -1, 2, 0), &[0, 90, 180]);
        let f = Convolution::new(vec![1.0; 9], true, false, false, 0.0);
        assert_eq!(run(&f, &src).pix(), &[30, 90, 150]);
    }

    #[test]
    fn test_convolution_abs_and_delta() {
        let src = gray(Rect::from_size(2, 2), &[100, 100, 100, 100]);
        let f = Convolution::new(vec![-1.0], false, false, true, 0.0);
        assert_eq!(run(&f, &src).pix(), &[100; 4]);

        let src = gray(Rect::from_size(2, 1), &[0, 0]);
        let identity = vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let f = Convolution::new(identity, false, false, false, 0.2);
        assert_eq!(run(&f, &src).pix(), &[51, 51]);
    }

    #[test]
    fn test_convolution_alpha_from_center() {
        let mut src = Raster::new(RasterFormat::Rgba8, Rect::from_size(3, 1));
        src.set(0, 0, Pixel::new(1.0, 0.0, 0.0, 1.0));
        src.set(1, 0, Pixel::new(1.0, 0.0, 0.0, 0.2));
        src.set(2, 0, Pixel::new(1.0, 0.0, 0.0, 1.0));
        let f = Convolution::new(vec![1.0; 9], true, false, false, 0.0);
        let mut dst = Raster::new(RasterFormat::Rgba8, f.bounds(src.bounds()));
        f.apply(&mut dst, &src, &Options::default());
        assert_eq!(dst.pix()[4..8], [255, 0, 0, 51]);
    }

    #[test]
    fn test_convolution_empty_kernel_copies() {
        let src = gray(Rect::new(3, 3, 5, 4), &[7, 9]);
        let f = Convolution::new(Vec::new(), true, true, false, 0.0);
        assert_eq!(run(&f, &src).pix(), &[7, 9]);
    }

    #[test]
    fn test_convolution_sliding_window_bands() {
        let pix: Vec<u8> = (0..64).map(|i| (i * 3) as u8).collect();
        let src = gray(Rect::from_size(8, 8), &pix);
        let f = Convolution::new(vec![1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0], true, false, false, 0.0);
        let mut serial = Raster::new(RasterFormat::Gray8, f.bounds(src.bounds()));
        f.apply(&mut serial, &src, &Options { parallelization: false });
        let mut parallel = Raster::new(RasterFormat::Gray8, f.bounds(src.bounds()));
        f.apply(&mut parallel, &src, &Options { parallelization: true });
        assert_eq!(serial.pix(), parallel.pix());
    }

    #[test]
    fn test_gaussian_kernel() {
        assert!(gaussian_kernel(0.0).is_empty());
        assert!(gaussian_kernel(-1.0).is_empty());
        let k = gaussian_kernel(1.0);
        assert_eq!(k.len(), 7);
        assert_relative_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(k[0], k[6]);
        assert!(k[3] > k[2] && k[2] > k[1]);
        assert_eq!(gaussian_kernel(0.5).len(), 5);
    }

    #[test]
    fn test_gaussian_blur() {
        let src = gray(Rect::from_size(3, 3), &[200; 9]);
        assert_eq!(run(&GaussianBlur::new(1.5), &src).pix(), &[200; 9]);
        assert_eq!(run(&GaussianBlur::new(0.0), &src).pix(), &[200; 9]);

        let mut pix = [0u8; 25];
        pix[12] = 255;
        let src = gray(Rect::new(-2, -2, 3, 3), &pix);
        let out = run(&GaussianBlur::new(0.7), &src);
        let p = out.pix();
        assert!(p[12] < 255 && p[12] > p[7]);
        assert_eq!(p[7], p[11]);
        assert_eq!(p[7], p[13]);
        assert_eq!(p[7], p[17]);
        assert_eq!(p[6], p[18]);
    }

    #[test]
    fn test_unsharp_mask() {
        let src = gray(Rect::from_size(4, 4), &[128; 16]);
        assert_eq!(run(&UnsharpMask::new(1.0, 1.0, 0.0), &src).pix(), &[128; 16]);

        let src = gray(Rect::from_size(4, 1), &[50, 50, 200, 200]);
        let out = run(&UnsharpMask::new(1.0, 1.0, 0.0), &src);
        let p = out.pix();
        assert!(p[1] < 50);
        assert!(p[2] > 200);

        let out = run(&UnsharpMask::new(1.0, 1.0, 1.0), &src);
        assert_eq!(out.pix(), &[50, 50, 200, 200]);
    }

    #[test]
    fn test_mean() {
        let src = gray(Rect::new(-1, -1, 2, 0), &[0, 90, 180]);
        assert_eq!(run(&Mean::new(3, false), &src).pix(), &[30, 90, 150]);
        assert_eq!(run(&Mean::new(4, false), &src).pix(), &[30, 90, 150]);
        assert_eq!(run(&Mean::new(1, false), &src).pix(), &[0, 90, 180]);
        assert_eq!(run(&Mean::new(2, true), &src).pix(), &[0, 90, 180]);

        let src = gray(Rect::from_size(5, 5), &[60; 25]);
        assert_eq!(run(&Mean::new(5, true), &src).pix(), &[60; 25]);
    }

    #[test]
    fn test_sobel() {
        let src = gray(Rect::from_size(3, 3), &[90; 9]);
        assert_eq!(run(&Sobel, &src).pix(), &[0; 9]);

        let src = gray(
            Rect::new(-1, -1, 2, 2),
            &[0, 255, 255, 0, 255, 255, 0, 255, 255],
        );
        assert_eq!(run(&Sobel, &src).pix(), &[255, 255, 0, 255, 255, 0, 255, 255, 0]);
    }
}
