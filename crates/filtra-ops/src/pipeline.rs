//! Filter chains.
//!
//! A [`Pipeline`] runs its filters in order. Every stage but the last draws
//! into a 16-bit temporary sized by that stage's [`Filter::bounds`]; the last
//! stage draws straight into the caller's destination.
//!
//! # Example
//!
//! ```rust
//! use filtra_core::{Raster, RasterFormat, Rect, Source};
//! use filtra_ops::{GaussianBlur, Pipeline, Resampling, Resize, Transform};
//!
//! let mut p = Pipeline::default();
//! p.add(Resize::new(50, 0, Resampling::Lanczos))
//!     .add(GaussianBlur::new(1.0))
//!     .add(Transform::Rotate90);
//!
//! let src = Raster::new(RasterFormat::Rgba8, Rect::from_size(100, 40));
//! let mut dst = Raster::new(RasterFormat::Rgba8, p.bounds(src.bounds()));
//! assert_eq!(dst.bounds(), Rect::from_size(20, 50));
//! p.apply(&mut dst, &src);
//! ```

use std::fmt;

use filtra_core::{Point, Raster, Rect, Source, Target};
use tracing::debug;

use crate::composite::{draw, Operator};
use crate::filter::{copy_image, temp_image, Filter, Options};

/// Ordered list of filters plus execution options.
#[derive(Default)]
pub struct Pipeline {
    filters: Vec<Box<dyn Filter>>,
    options: Options,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("filters", &self.filters.len())
            .field("options", &self.options)
            .finish()
    }
}

impl Pipeline {
    /// Creates a pipeline from boxed filters.
    pub fn new(filters: Vec<Box<dyn Filter>>) -> Self {
        Self {
            filters,
            options: Options::default(),
        }
    }

    /// Appends a filter.
    pub fn add(&mut self, filter: impl Filter + 'static) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Appends an already boxed filter.
    pub fn add_boxed(&mut self, filter: Box<dyn Filter>) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Removes all filters.
    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// True when the pipeline has no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Enables or disables parallel pixel loops.
    pub fn set_parallelization(&mut self, enabled: bool) {
        self.options.parallelization = enabled;
    }

    /// Whether parallel pixel loops are enabled.
    pub fn parallelization(&self) -> bool {
        self.options.parallelization
    }

    /// Options passed to every filter.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Result bounds for a source covering `src`.
    ///
    /// An empty pipeline returns `src` unchanged.
    pub fn bounds(&self, src: Rect) -> Rect {
        self.filters.iter().fold(src, |b, f| f.bounds(b))
    }

    /// Runs every filter on `src` and writes the result into `dst`.
    ///
    /// An empty pipeline copies `src`.
    pub fn apply(&self, dst: &mut dyn Target, src: &dyn Source) {
        let Some(last) = self.filters.len().checked_sub(1) else {
            copy_image(dst, src, &self.options);
            return;
        };

        let mut current: Option<Raster> = None;
        for (i, f) in self.filters.iter().enumerate() {
            let input: &dyn Source = match &current {
                Some(tmp) => tmp,
                None => src,
            };
            debug!(stage = i, of = last + 1, bounds = %input.bounds(), "pipeline stage");
            if i == last {
                f.apply(dst, input, &self.options);
            } else {
                let mut tmp = temp_image(f.bounds(input.bounds()));
                f.apply(&mut tmp, input, &self.options);
                current = Some(tmp);
            }
        }
    }

    /// Runs the pipeline and places the result with its top-left corner at `pt`.
    ///
    /// [`Operator::Copy`] replaces the covered destination pixels,
    /// [`Operator::Over`] composites the result over them. Parts falling
    /// outside `dst` are dropped.
    pub fn apply_at(&self, dst: &mut dyn Target, src: &dyn Source, pt: Point, operator: Operator) {
        let b = self.bounds(src.bounds());
        let rect = Rect::from_size(b.width(), b.height()).translate(pt.x, pt.y);
        if rect.is_empty() {
            return;
        }

        if operator == Operator::Copy && dst.bounds().intersect(&rect) == rect {
            if let Some(mut sub) = dst.sub_target(rect) {
                debug!(%rect, "pipeline into sub-target");
                self.apply(sub.as_mut(), src);
                return;
            }
        }

        let mut tmp = temp_image(rect);
        self.apply(&mut tmp, src);
        draw(dst, &tmp, operator, &self.options);
    }
}

impl Filter for Pipeline {
    fn bounds(&self, src: Rect) -> Rect {
        Pipeline::bounds(self, src)
    }

    /// Nested pipelines keep their own options.
    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, _options: &Options) {
        Pipeline::apply(self, dst, src);
    }
}
