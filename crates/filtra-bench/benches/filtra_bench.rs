//! Benchmarks for filtra filters.
//!
//! Run with: `cargo bench`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use filtra_core::{Pixel, Raster, RasterFormat, Rect, Source};
use filtra_ops::{
    Filter, GaussianBlur, Interpolation, Options, RankFilter, Resampling, Resize, Rotate,
};

fn test_image(size: i32) -> Raster {
    let mut img = Raster::new(RasterFormat::Rgba8, Rect::from_size(size, size));
    for (i, p) in img.pix_mut().chunks_exact_mut(4).enumerate() {
        p[0] = (i * 7) as u8;
        p[1] = (i * 13) as u8;
        p[2] = (i * 29) as u8;
        p[3] = 0xff;
    }
    img
}

fn run(f: &dyn Filter, src: &Raster, options: &Options) -> Raster {
    let mut dst = Raster::new(RasterFormat::Rgba8, f.bounds(src.bounds()));
    f.apply(&mut dst, src, options);
    dst
}

/// Benchmark resampling kernels at a fixed downscale.
fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize");
    let src = test_image(512);
    let options = Options::default();
    group.throughput(Throughput::Elements(512 * 512));

    for resampling in [
        Resampling::Nearest,
        Resampling::Box,
        Resampling::Linear,
        Resampling::Cubic,
        Resampling::Lanczos,
    ] {
        let f = Resize::new(200, 0, resampling);
        group.bench_with_input(
            BenchmarkId::new("512_to_200", format!("{resampling:?}")),
            &src,
            |b, src| b.iter(|| run(black_box(&f), src, &options)),
        );
    }

    group.finish();
}

/// Benchmark gaussian blur, serial against parallel.
fn bench_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("blur");

    for size in [128, 512] {
        let src = test_image(size);
        group.throughput(Throughput::Elements((size * size) as u64));

        for parallelization in [false, true] {
            let options = Options { parallelization };
            let id = if parallelization { "parallel" } else { "serial" };
            group.bench_with_input(BenchmarkId::new(id, size), &src, |b, src| {
                b.iter(|| run(&GaussianBlur::new(black_box(2.0)), src, &options))
            });
        }
    }

    group.finish();
}

/// Benchmark rank filters for growing kernels.
fn bench_median(c: &mut Criterion) {
    let mut group = c.benchmark_group("median");
    let src = test_image(256);
    let options = Options::default();
    group.throughput(Throughput::Elements(256 * 256));

    for ksize in [3, 5, 9] {
        group.bench_with_input(BenchmarkId::new("square", ksize), &ksize, |b, &k| {
            b.iter(|| run(&RankFilter::median(k, false), &src, &options))
        });
        group.bench_with_input(BenchmarkId::new("disk", ksize), &ksize, |b, &k| {
            b.iter(|| run(&RankFilter::median(k, true), &src, &options))
        });
    }

    group.finish();
}

/// Benchmark arbitrary-angle rotation per interpolation mode.
fn bench_rotate(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotate");
    let src = test_image(256);
    let options = Options::default();
    group.throughput(Throughput::Elements(256 * 256));

    for interpolation in [
        Interpolation::Nearest,
        Interpolation::Linear,
        Interpolation::Cubic,
    ] {
        let f = Rotate::new(30.0, Pixel::BLACK, interpolation);
        group.bench_function(format!("{interpolation:?}"), |b| {
            b.iter(|| run(black_box(&f), &src, &options))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resize, bench_blur, bench_median, bench_rotate);
criterion_main!(benches);
