//! Benchmarks for the spectral-index kernels

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use deltaspec_algorithms::{bands, ndvi, normalized_difference, quality_mosaic, SpectralIndex};
use deltaspec_core::{Image, ImageCollection, Raster};

fn create_band(size: usize, base: f64) -> Raster<f64> {
    let mut r = Raster::new(size, size);
    for row in 0..size {
        for col in 0..size {
            let v = base + ((row * 7 + col * 13) % 200) as f64;
            r.set(row, col, v).unwrap();
        }
    }
    r
}

fn create_image(size: usize) -> Image {
    Image::from_bands(vec![
        (bands::RED.to_string(), create_band(size, 100.0)),
        (bands::NIR.to_string(), create_band(size, 300.0)),
    ])
    .unwrap()
}

fn bench_ndvi(c: &mut Criterion) {
    let mut group = c.benchmark_group("indices/ndvi");
    for size in [256, 512, 1024, 2048] {
        let image = create_image(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| ndvi(black_box(&image)).unwrap())
        });
    }
    group.finish();
}

fn bench_normalized_difference(c: &mut Criterion) {
    let mut group = c.benchmark_group("indices/normalized_difference");
    for size in [256, 512, 1024, 2048] {
        let a = create_band(size, 300.0);
        let b_raster = create_band(size, 100.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| normalized_difference(black_box(&a), black_box(&b_raster)).unwrap())
        });
    }
    group.finish();
}

fn bench_quality_mosaic(c: &mut Criterion) {
    let mut group = c.benchmark_group("indices/quality_mosaic");
    for size in [256, 512, 1024] {
        let images: Vec<Image> = (0..4)
            .map(|i| {
                Image::from_band(
                    SpectralIndex::Ndvi.name(),
                    create_band(size, 50.0 * i as f64),
                )
            })
            .collect();
        let collection = ImageCollection::from_images(images).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| quality_mosaic(black_box(&collection), "NDVI").unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_ndvi,
    bench_normalized_difference,
    bench_quality_mosaic
);
criterion_main!(benches);
