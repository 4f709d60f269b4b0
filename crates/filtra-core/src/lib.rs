//! # filtra-core
//!
//! Core types for the filtra image filtering toolkit.
//!
//! This crate provides the foundation every filter engine is written against:
//!
//! - [`Rect`], [`Point`] - Integer image-space geometry with arbitrary origins
//! - [`Pixel`] - Canonical `f32` RGBA pixel, non-premultiplied
//! - [`Raster`], [`Paletted`], [`YCbCr`], [`Generic`] - Pixel storages
//! - [`Source`], [`Target`] - What filters read from and write into
//! - [`Reader`], [`Writer`] - Format-agnostic pixel accessor
//!
//! ## Design Philosophy
//!
//! Filters never branch on storage formats. Each image resolves its format
//! once, when a [`Reader`] or [`Writer`] is built, and every engine then works
//! on canonical pixels:
//!
//! ```rust
//! use filtra_core::{Pixel, Raster, RasterFormat, Rect, Source, Target};
//!
//! let mut src = Raster::new(RasterFormat::Gray16, Rect::new(-1, -1, 1, 1));
//! src.set(0, 0, Pixel::WHITE);
//!
//! let mut dst = Raster::new(RasterFormat::PremulRgba8, src.bounds());
//! let reader = src.reader();
//! let mut writer = dst.writer();
//! writer.set_pixel(0, 0, reader.pixel(0, 0));
//! assert_eq!(dst.get(0, 0), Pixel::WHITE);
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! filtra-core (this crate)
//!    ^
//!    |
//!    +-- filtra-ops (filters, pipeline, configuration)
//!    +-- filtra-tests, filtra-bench
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Serialization for geometry, pixels and format tags

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod accessor;
pub mod error;
pub mod format;
pub mod image;
pub mod pixel;
pub mod rect;

// Re-exports for convenience
pub use accessor::{Reader, Writer, nearest_palette_index, ycbcr_to_rgb};
pub use error::{Error, Result};
pub use format::*;
pub use image::*;
pub use pixel::Pixel;
pub use rect::*;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use filtra_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::accessor::{Reader, Writer};
    pub use crate::error::{Error, Result};
    pub use crate::format::{PixelFormat, RasterFormat, SubsampleRatio};
    pub use crate::image::{
        ColorSink, ColorSource, Generic, Paletted, Raster, RasterViewMut, Source, Target, YCbCr,
    };
    pub use crate::pixel::Pixel;
    pub use crate::rect::{Point, Rect};
}
