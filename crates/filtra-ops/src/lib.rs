//! # filtra-ops
//!
//! Image filters and pipelines for the filtra toolkit.
//!
//! Every filter implements [`Filter`]: it reports the bounds of its result
//! for a given source rectangle and draws into any [`Target`](filtra_core::Target).
//! Filters are plain values and can be shared across threads.
//!
//! # Modules
//!
//! - [`resize`] - Separable resampling: nearest, box, linear, cubic, Lanczos
//! - [`convolution`] - Square kernels, gaussian blur, unsharp mask, mean, Sobel
//! - [`rank`] - Median, minimum and maximum filters
//! - [`transform`] - Exact transforms, arbitrary rotation, cropping
//! - [`colors`] - Per-channel and per-pixel colour functions
//! - [`effects`] - Pixelate
//! - [`composite`] - Porter-Duff over
//! - [`pipeline`] - Filter chains
//! - [`config`] - YAML pipeline descriptions
//! - [`parallel`] - Row-partitioned execution on the rayon pool
//!
//! # Example
//!
//! ```rust
//! use filtra_core::{Raster, RasterFormat, Rect, Source};
//! use filtra_ops::{ColorFunc, Pipeline, RankFilter, Resampling, ResizeToFit};
//!
//! let src = Raster::new(RasterFormat::Rgba8, Rect::from_size(640, 480));
//!
//! let mut p = Pipeline::default();
//! p.add(ResizeToFit::new(320, 320, Resampling::Lanczos))
//!     .add(RankFilter::median(3, false))
//!     .add(ColorFunc::gamma(1.2));
//!
//! let mut dst = Raster::new(RasterFormat::Rgba8, p.bounds(src.bounds()));
//! assert_eq!(dst.bounds(), Rect::from_size(320, 240));
//! p.apply(&mut dst, &src);
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default) - Run pixel loops on the rayon pool
//! - `serde` - Serialization for core geometry and pixel types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod colors;
pub mod composite;
pub mod config;
pub mod convolution;
pub mod effects;
pub mod filter;
pub mod parallel;
pub mod pipeline;
pub mod rank;
pub mod resize;
pub mod transform;

pub use colors::{ColorFunc, PixelFunc};
pub use composite::Operator;
pub use config::{FilterConfig, PipelineConfig};
pub use convolution::{Convolution, GaussianBlur, Mean, Sobel, UnsharpMask};
pub use effects::Pixelate;
pub use error::{OpsError, OpsResult};
pub use filter::{CopyImage, Filter, Options};
pub use pipeline::Pipeline;
pub use rank::{RankFilter, RankMode};
pub use resize::{Resampling, Resize, ResizeToFill, ResizeToFit};
pub use transform::{Anchor, Crop, CropToSize, Interpolation, Rotate, Transform};
