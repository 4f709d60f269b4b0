//! Data-parallel execution over integer ranges.
//!
//! Every engine drives its pixel loop through this module. A range
//! `[start, stop)` is cut into contiguous, gap-free parts, one per worker;
//! each part runs to completion and the call returns once all parts are done.
//!
//! With the `parallel` feature the parts run on the rayon pool. Without it,
//! or with [`Options::parallelization`](crate::Options) turned off, the
//! whole range is processed by one synchronous call.
//!
//! # Destination rows
//!
//! [`parallelize_rows`] additionally splits the destination [`Writer`] into
//! disjoint row bands, so each worker owns the rows it writes:
//!
//! ```rust
//! use filtra_core::{Pixel, Raster, RasterFormat, Rect, Target};
//! use filtra_ops::parallel::parallelize_rows;
//!
//! let mut img = Raster::new(RasterFormat::Gray8, Rect::from_size(8, 8));
//! parallelize_rows(true, img.writer(), 0, 8, |w, start, stop| {
//!     for y in start..stop {
//!         w.set_row(y, &[Pixel::WHITE; 8]);
//!     }
//! });
//! assert!(img.pix().iter().all(|&v| v == 255));
//! ```

use std::ops::Range;

use filtra_core::Writer;

/// Number of workers used when parallelism is `enabled`.
#[inline]
pub fn worker_count(enabled: bool) -> usize {
    #[cfg(feature = "parallel")]
    {
        if enabled {
            return rayon::current_num_threads().max(1);
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = enabled;
    1
}

/// Splits `[start, stop)` into `min(workers, len)` contiguous parts.
///
/// Parts are as equal as integer division allows; the remainder goes one by
/// one to the earliest parts. `workers == 0` counts as one worker, and an
/// empty range yields no parts.
///
/// ```rust
/// use filtra_ops::parallel::split_range;
///
/// assert_eq!(split_range(0, 10, 3), vec![0..4, 4..7, 7..10]);
/// assert_eq!(split_range(5, 7, 8), vec![5..6, 6..7]);
/// assert!(split_range(3, 3, 4).is_empty());
/// ```
pub fn split_range(start: i32, stop: i32, workers: usize) -> Vec<Range<i32>> {
    let len = (stop as i64 - start as i64).max(0) as usize;
    if len == 0 {
        return Vec::new();
    }
    let parts = workers.max(1).min(len);
    let base = len / parts;
    let extra = len % parts;

    let mut out = Vec::with_capacity(parts);
    let mut lo = start;
    for i in 0..parts {
        let size = base + usize::from(i < extra);
        let hi = lo + size as i32;
        out.push(lo..hi);
        lo = hi;
    }
    out
}

/// Runs `f(part_start, part_end)` once per part of `[start, stop)`.
///
/// Blocks until every part has finished.
pub fn parallelize<F>(enabled: bool, start: i32, stop: i32, f: F)
where
    F: Fn(i32, i32) + Sync,
{
    let parts = split_range(start, stop, worker_count(enabled));
    match parts.as_slice() {
        [] => {}
        [only] => f(only.start, only.end),
        #[cfg(feature = "parallel")]
        _ => {
            let f = &f;
            rayon::scope(|s| {
                for part in parts.iter().cloned() {
                    s.spawn(move |_| f(part.start, part.end));
                }
            });
        }
        #[cfg(not(feature = "parallel"))]
        _ => {
            for part in &parts {
                f(part.start, part.end);
            }
        }
    }
}

/// Runs `f(band, part_start, part_end)` over destination rows.
///
/// The row range is clipped to the writer's bounds and partitioned like
/// [`parallelize`]; every part gets the writer band owning exactly its rows.
/// Writers that cannot be split run as a single part.
pub fn parallelize_rows<F>(enabled: bool, writer: Writer<'_>, start: i32, stop: i32, f: F)
where
    F: Fn(&mut Writer<'_>, i32, i32) + Sync,
{
    let b = writer.bounds();
    let start = start.max(b.min_y);
    let stop = stop.min(b.max_y);
    if start >= stop || b.is_empty() {
        return;
    }

    let workers = if writer.can_split() {
        worker_count(enabled)
    } else {
        1
    };
    let parts = split_range(start, stop, workers);
    if parts.len() == 1 {
        let mut writer = writer;
        f(&mut writer, start, stop);
        return;
    }

    let bands = writer.split_rows(&parts);
    run_bands(bands, parts, &f);
}

#[cfg(feature = "parallel")]
fn run_bands<F>(bands: Vec<Writer<'_>>, parts: Vec<Range<i32>>, f: &F)
where
    F: Fn(&mut Writer<'_>, i32, i32) + Sync,
{
    rayon::scope(|s| {
        for (mut band, part) in bands.into_iter().zip(parts) {
            s.spawn(move |_| f(&mut band, part.start, part.end));
        }
    });
}

#[cfg(not(feature = "parallel"))]
fn run_bands<F>(bands: Vec<Writer<'_>>, parts: Vec<Range<i32>>, f: &F)
where
    F: Fn(&mut Writer<'_>, i32, i32) + Sync,
{
    for (mut band, part) in bands.into_iter().zip(parts) {
        f(&mut band, part.start, part.end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filtra_core::{Pixel, Raster, RasterFormat, Rect, Target};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_split_range_coverage() {
        let start = -55;
        for len in 0..100 {
            for workers in 0..100 {
                let parts = split_range(start, start + len, workers);
                let expected_parts = if len == 0 {
                    0
                } else {
                    (workers.max(1)).min(len as usize)
                };
                assert_eq!(parts.len(), expected_parts, "len={len} workers={workers}");

                let mut next = start;
                for p in &parts {
                    assert_eq!(p.start, next, "gap or overlap");
                    assert!(p.end > p.start, "empty part");
                    next = p.end;
                }
                if len > 0 {
                    assert_eq!(next, start + len);
                }

                if let (Some(first), Some(last)) = (parts.first(), parts.last()) {
                    assert!(first.len() - last.len() <= 1);
                }
            }
        }
    }

    #[test]
    fn test_parallelize_visits_each_index_once() {
        let counts: Vec<AtomicUsize> = (0..200).map(|_| AtomicUsize::new(0)).collect();
        for enabled in [false, true] {
            parallelize(enabled, -100, 100, |lo, hi| {
                for i in lo..hi {
                    counts[(i + 100) as usize].fetch_add(1, Ordering::Relaxed);
                }
            });
        }
        assert!(counts.iter().all(|c| c.load(Ordering::Relaxed) == 2));
    }

    #[test]
    fn test_parallelize_empty_range() {
        let calls = AtomicUsize::new(0);
        parallelize(true, 5, 5, |_, _| {
            calls.fetch_add(1, Ordering::Relaxed);
        });
        parallelize(true, 5, 1, |_, _| {
            calls.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_parallelize_rows_clips_to_writer() {
        let mut img = Raster::new(RasterFormat::Gray8, Rect::new(0, -3, 3, 40));
        let rows = AtomicUsize::new(0);
        parallelize_rows(true, img.writer(), -10, 100, |w, lo, hi| {
            for y in lo..hi {
                rows.fetch_add(1, Ordering::Relaxed);
                w.set_row(y, &[Pixel::gray((y + 3) as f32 / 255.0); 3]);
            }
        });
        assert_eq!(rows.load(Ordering::Relaxed), 43);
        for (i, row) in img.pix().chunks_exact(3).enumerate() {
            assert!(row.iter().all(|&v| v as usize == i));
        }
    }
}
