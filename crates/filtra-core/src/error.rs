//! Error types for filtra-core.
//!
//! Pixel access itself never fails: reads are clamped by their callers and
//! writes outside an image are dropped. Errors only surface when a storage is
//! assembled from caller-provided buffers.
//!
//! # Usage
//!
//! ```rust
//! use filtra_core::{Error, Raster, RasterFormat, Rect};
//!
//! let err = Raster::from_pix(RasterFormat::Rgba8, Rect::from_size(2, 2), vec![0; 3])
//!     .unwrap_err();
//! assert!(matches!(err, Error::BufferSize { .. }));
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing pixel storages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A pixel buffer does not match the size implied by its bounds.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize {
        /// Number of bytes the bounds require.
        expected: usize,
        /// Number of bytes provided.
        actual: usize,
    },

    /// A palette holds more entries than an 8-bit index can address.
    #[error("palette has {0} entries, at most 256 are addressable")]
    PaletteTooLarge(usize),

    /// Image dimensions are unusable (overflow).
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),
}
