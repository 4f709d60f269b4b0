//! Canonical floating-point pixel and quantization helpers.
//!
//! Every engine in filtra works on [`Pixel`]: four `f32` channels with
//! **non-premultiplied** alpha, nominally in `[0, 1]`. Values may leave that
//! range during intermediate computation (sharpening, convolution with
//! negative taps); they are clamped only when written back into a storage.
//!
//! # Quantization
//!
//! Write-back rounds half up and saturates:
//!
//! ```rust
//! use filtra_core::pixel::{quantize_u8, quantize_u16};
//!
//! assert_eq!(quantize_u8(127.5), 128);
//! assert_eq!(quantize_u8(-3.0), 0);
//! assert_eq!(quantize_u8(300.0), 255);
//! assert_eq!(quantize_u16(65535.4), 65535);
//! ```

use std::ops::{Add, Mul};

/// Scale of one 8-bit quantization step.
pub const QF8: f32 = 1.0 / 255.0;

/// Scale of one 16-bit quantization step.
pub const QF16: f32 = 1.0 / 65535.0;

/// Rec. 601 luma weight for red.
pub const LUMA_R: f32 = 0.299;
/// Rec. 601 luma weight for green.
pub const LUMA_G: f32 = 0.587;
/// Rec. 601 luma weight for blue.
pub const LUMA_B: f32 = 0.114;

// ============================================================================
// Pixel
// ============================================================================

/// RGBA pixel with non-premultiplied `f32` channels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pixel {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha (coverage), not multiplied into the colour channels.
    pub a: f32,
}

impl Pixel {
    /// Fully transparent black, the result of every degenerate computation.
    pub const TRANSPARENT: Pixel = Pixel::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Pixel = Pixel::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Pixel = Pixel::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a pixel.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque gray pixel.
    #[inline]
    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v, 1.0)
    }

    /// Converts non-premultiplied 8-bit channels.
    #[inline]
    pub fn from_rgba8(c: [u8; 4]) -> Self {
        Self::new(
            c[0] as f32 * QF8,
            c[1] as f32 * QF8,
            c[2] as f32 * QF8,
            c[3] as f32 * QF8,
        )
    }

    /// Quantizes to non-premultiplied 8-bit channels.
    #[inline]
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            quantize_u8(self.r * 255.0),
            quantize_u8(self.g * 255.0),
            quantize_u8(self.b * 255.0),
            quantize_u8(self.a * 255.0),
        ]
    }

    /// Converts non-premultiplied 16-bit channels.
    #[inline]
    pub fn from_rgba16(c: [u16; 4]) -> Self {
        Self::new(
            c[0] as f32 * QF16,
            c[1] as f32 * QF16,
            c[2] as f32 * QF16,
            c[3] as f32 * QF16,
        )
    }

    /// Quantizes to non-premultiplied 16-bit channels.
    #[inline]
    pub fn to_rgba16(&self) -> [u16; 4] {
        [
            quantize_u16(self.r * 65535.0),
            quantize_u16(self.g * 65535.0),
            quantize_u16(self.b * 65535.0),
            quantize_u16(self.a * 65535.0),
        ]
    }

    /// Rec. 601 luma of the colour channels (alpha ignored).
    #[inline]
    pub fn luma(&self) -> f32 {
        LUMA_R * self.r + LUMA_G * self.g + LUMA_B * self.b
    }

    /// Every channel clamped to `[0, 1]`.
    #[inline]
    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }

    /// Channels as an array `[r, g, b, a]`.
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Applies `f` to the colour channels, keeping alpha.
    #[inline]
    pub fn map_rgb(self, f: impl Fn(f32) -> f32) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b), self.a)
    }
}

impl From<[f32; 4]> for Pixel {
    #[inline]
    fn from(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Pixel> for [f32; 4] {
    #[inline]
    fn from(p: Pixel) -> Self {
        p.to_array()
    }
}

impl Add for Pixel {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a + rhs.a)
    }
}

impl Mul<f32> for Pixel {
    type Output = Self;

    #[inline]
    fn mul(self, s: f32) -> Self {
        Self::new(self.r * s, self.g * s, self.b * s, self.a * s)
    }
}

// ============================================================================
// Quantization
// ============================================================================

/// Rounds half up and saturates to `0..=255`.
#[inline]
pub fn quantize_u8(v: f32) -> u8 {
    let x = (v + 0.5) as i64;
    x.clamp(0, 0xff) as u8
}

/// Rounds half up and saturates to `0..=65535`.
#[inline]
pub fn quantize_u16(v: f32) -> u16 {
    let x = (v + 0.5) as i64;
    x.clamp(0, 0xffff) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quantize_u8() {
        let cases = [
            (-1.0, 0u8),
            (0.0, 0),
            (0.49, 0),
            (0.5, 1),
            (1.0, 1),
            (127.5, 128),
            (254.4, 254),
            (254.5, 255),
            (255.0, 255),
            (1000.0, 255),
        ];
        for (v, want) in cases {
            assert_eq!(quantize_u8(v), want, "quantize_u8({v})");
        }
    }

    #[test]
    fn test_quantize_u16() {
        assert_eq!(quantize_u16(-0.7), 0);
        assert_eq!(quantize_u16(32767.5), 32768);
        assert_eq!(quantize_u16(65534.6), 65535);
        assert_eq!(quantize_u16(1.0e9), 65535);
    }

    #[test]
    fn test_rgba8_roundtrip() {
        for v in [0u8, 1, 77, 128, 254, 255] {
            let c = [v, 255 - v, v / 2, 255];
            assert_eq!(Pixel::from_rgba8(c).to_rgba8(), c);
        }
    }

    #[test]
    fn test_luma() {
        assert_abs_diff_eq!(Pixel::WHITE.luma(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(Pixel::new(1.0, 0.0, 0.0, 1.0).luma(), 0.299, epsilon = 1e-6);
    }

    #[test]
    fn test_pixel_ops() {
        let p = Pixel::new(0.25, 0.5, 0.75, 1.0) * 2.0 + Pixel::TRANSPARENT;
        assert_eq!(p, Pixel::new(0.5, 1.0, 1.5, 2.0));
        assert_eq!(p.clamped(), Pixel::new(0.5, 1.0, 1.0, 1.0));
        assert_eq!(p.map_rgb(|c| c * 0.0).a, 2.0);
    }
}
