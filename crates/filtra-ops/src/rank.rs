//! Rank filters: local median, minimum and maximum.
//!
//! The neighbourhood is a `ksize x ksize` window (or the disk inscribed in
//! it) that slides along each row one column at a time. Source coordinates
//! are clamped to the image edges.

use std::collections::VecDeque;

use filtra_core::{Pixel, Rect, Source, Target};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filter::{copy_image, Filter, Options};
use crate::parallel::parallelize_rows;

/// Statistic picked from the neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMode {
    /// Middle value per channel.
    #[default]
    Median,
    /// Smallest value per channel.
    Minimum,
    /// Largest value per channel.
    Maximum,
}

/// Rank filter over a square or disk neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankFilter {
    /// Neighbourhood size; even values are decremented.
    pub ksize: usize,
    /// Use a disk instead of a square.
    pub disk: bool,
    /// Statistic to compute.
    pub mode: RankMode,
}

impl RankFilter {
    /// Local median.
    pub fn median(ksize: usize, disk: bool) -> Self {
        Self {
            ksize,
            disk,
            mode: RankMode::Median,
        }
    }

    /// Local minimum.
    pub fn minimum(ksize: usize, disk: bool) -> Self {
        Self {
            ksize,
            disk,
            mode: RankMode::Minimum,
        }
    }

    /// Local maximum.
    pub fn maximum(ksize: usize, disk: bool) -> Self {
        Self {
            ksize,
            disk,
            mode: RankMode::Maximum,
        }
    }
}

/// Per-channel scratch for one window.
#[derive(Default)]
struct Channels {
    r: Vec<f32>,
    g: Vec<f32>,
    b: Vec<f32>,
    a: Vec<f32>,
}

impl Channels {
    fn clear(&mut self) {
        self.r.clear();
        self.g.clear();
        self.b.clear();
        self.a.clear();
    }

    fn median(&mut self, opaque: bool) -> Pixel {
        sort_f32(&mut self.r);
        sort_f32(&mut self.g);
        sort_f32(&mut self.b);
        let idx = self.r.len() / 2;
        let a = if opaque {
            1.0
        } else {
            sort_f32(&mut self.a);
            self.a[idx]
        };
        Pixel::new(self.r[idx], self.g[idx], self.b[idx], a)
    }
}

impl Filter for RankFilter {
    fn bounds(&self, src: Rect) -> Rect {
        src.to_origin()
    }

    fn apply(&self, dst: &mut dyn Target, src: &dyn Source, options: &Options) {
        let srcb = src.bounds();
        let dstb = dst.bounds();
        if srcb.is_empty() {
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
        let kradius = (ksize / 2) as i32;
        let opaque = src.is_opaque();
        let disk = self.disk.then(|| gen_disk(ksize));
        debug!(ksize, disk = self.disk, mode = ?self.mode, opaque, "rank filter");

        let reader = src.reader();
        let fill_column = |col: &mut Vec<Pixel>, x: i32, y: i32| {
            let x = srcb.clamp_x(x);
            col.clear();
            col.extend((y - kradius..=y + kradius).map(|j| reader.pixel(x, srcb.clamp_y(j))));
        };

        parallelize_rows(
            options.parallelization,
            dst.writer(),
            dstb.min_y,
            dstb.min_y + srcb.height(),
            |out, lo, hi| {
                // columns are recycled as the window slides
                let mut window: VecDeque<Vec<Pixel>> =
                    (0..ksize).map(|_| Vec::with_capacity(ksize)).collect();
                let mut chans = Channels::default();
                let mut buf = vec![Pixel::TRANSPARENT; srcb.width() as usize];

                for y in lo..hi {
                    let sy = srcb.min_y + y - dstb.min_y;
                    for (col, i) in window.iter_mut().zip(-kradius..=kradius) {
                        fill_column(col, srcb.min_x + i, sy);
                    }

                    for (dx, p) in buf.iter_mut().enumerate() {
                        let (mut lo_px, mut hi_px) = (Pixel::new(1.0, 1.0, 1.0, 1.0), Pixel::TRANSPARENT);
                        chans.clear();

                        for (i, col) in window.iter().enumerate() {
                            for (j, px) in col.iter().enumerate() {
                                if let Some(d) = &disk {
                                    if d[i * ksize + j] == 0.0 {
                                        continue;
                                    }
                                }
                                match self.mode {
                                    RankMode::Median => {
                                        chans.r.push(px.r);
                                        chans.g.push(px.g);
                                        chans.b.push(px.b);
                                        if !opaque {
                                            chans.a.push(px.a);
                                        }
                                    }
                                    RankMode::Minimum => {
                                        lo_px.r = lo_px.r.min(px.r);
                                        lo_px.g = lo_px.g.min(px.g);
                                        lo_px.b = lo_px.b.min(px.b);
                                        if !opaque {
                                            lo_px.a = lo_px.a.min(px.a);
                                        }
                                    }
                                    RankMode::Maximum => {
                                        hi_px.r = hi_px.r.max(px.r);
                                        hi_px.g = hi_px.g.max(px.g);
                                        hi_px.b = hi_px.b.max(px.b);
                                        if !opaque {
                                            hi_px.a = hi_px.a.max(px.a);
                                        }
                                    }
                                }
                            }
                        }

                        let mut res = match self.mode {
                            RankMode::Median => chans.median(opaque),
                            RankMode::Minimum => lo_px,
                            RankMode::Maximum => hi_px,
                        };
                        if opaque {
                            res.a = 1.0;
                        }
                        *p = res;

                        let x = srcb.min_x + dx as i32;
                        if x < srcb.max_x - 1 {
                            let mut col = window.pop_front().unwrap_or_default();
                            fill_column(&mut col, x + 1 + kradius, sy);
                            window.push_back(col);
                        }
                    }
                    out.set_row(y, &buf);
                }
            },
        );
    }
}

/// Disk mask for a `k x k` neighbourhood, row-major, 1 inside and 0 outside.
///
/// Even `k` is decremented first; `k < 1` gives an empty mask. A cell is
/// inside when its distance from the centre is at most `k / 2`.
///
/// ```rust
/// use filtra_ops::rank::gen_disk;
///
/// assert_eq!(gen_disk(3), vec![0.0, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0, 0.0]);
/// ```
pub fn gen_disk(k: usize) -> Vec<f32> {
    let k = if k % 2 == 0 { k.saturating_sub(1) } else { k };
    if k < 1 {
        return Vec::new();
    }
    let c = (k / 2) as i64;
    let mut disk = vec![0.0; k * k];
    for i in 0..k {
        for j in 0..k {
            let dx = c - i as i64;
            let dy = c - j as i64;
            if (((dx * dx + dy * dy) as f64).sqrt()) <= c as f64 {
                disk[j * k + i] = 1.0;
            }
        }
    }
    disk
}

const INSERTION_SORT_MAX: usize = 12;

/// Sorts `data` in non-decreasing order.
///
/// Short slices use insertion sort; longer ones use Hoare partitioning with
/// an explicit stack, so deep inputs never recurse.
pub fn sort_f32(data: &mut [f32]) {
    if data.len() < INSERTION_SORT_MAX {
        insertion_sort(data);
        return;
    }

    let mut stack = vec![(0usize, data.len() - 1)];
    while let Some((start, stop)) = stack.pop() {
        if stop <= start {
            continue;
        }
        if stop - start + 1 < INSERTION_SORT_MAX {
            insertion_sort(&mut data[start..=stop]);
            continue;
        }

        let pivot = data[start + (stop - start) / 2];
        let (mut i, mut j) = (start as isize, stop as isize);
        while i <= j {
            while data[i as usize] < pivot {
                i += 1;
            }
            while data[j as usize] > pivot {
                j -= 1;
            }
            if i <= j {
                data.swap(i as usize, j as usize);
                i += 1;
                j -= 1;
            }
        }
        if (i as usize) < stop {
            stack.push((i as usize, stop));
        }
        if j > start as isize {
            stack.push((start, j as usize));
        }
    }
}

fn insertion_sort(data: &mut [f32]) {
    for i in 1..data.len() {
        let mut j = i;
        while j > 0 && data[j - 1] > data[j] {
            data.swap(j - 1, j);
            j -= 1;
        }
    }
}
