//! Benchmark for coherent noise sampling.
//!
//! TARGET: 1,000,000 fractal samples per second
//!
//! Run with: cargo bench --package emberdeep_procedural --bench noise_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use emberdeep_procedural::noise::{CoherentNoise, FractalKind, NoiseKind, NoiseSettings, WorldSeed};

fn single_octave(kind: NoiseKind) -> NoiseSettings {
    NoiseSettings::default().with_kind(kind).with_fractal(FractalKind::None)
}

fn benchmark_base_kinds(c: &mut Criterion) {
    let mut group = c.benchmark_group("base_sample");

    for (name, kind) in [
        ("simplex", NoiseKind::Simplex),
        ("perlin", NoiseKind::Perlin),
        ("value", NoiseKind::Value),
    ] {
        let noise = CoherentNoise::new(WorldSeed::new(42), single_octave(kind));
        group.bench_function(name, |b| {
            let mut x = 0.0f64;
            b.iter(|| {
                x += 0.1;
                black_box(noise.sample(black_box(x), black_box(x * 0.7)))
            });
        });
    }

    group.finish();
}

fn benchmark_million_samples(c: &mut Criterion) {
    let noise = CoherentNoise::new(WorldSeed::new(42), NoiseSettings::default());

    let mut group = c.benchmark_group("million_samples");
    group.throughput(Throughput::Elements(1_000_000));
    group.sample_size(10);

    group.bench_function("1M_fbm_perlin_samples", |b| {
        b.iter(|| {
            for i in 0..1_000_000 {
                let x = f64::from(i % 1000);
                let y = f64::from(i / 1000);
                black_box(noise.sample(x, y));
            }
        });
    });

    group.finish();
}

fn benchmark_fractals(c: &mut Criterion) {
    let mut group = c.benchmark_group("fractal_6_octaves");

    for (name, fractal) in [("fbm", FractalKind::Fbm), ("ridged", FractalKind::Ridged)] {
        let settings = NoiseSettings { octaves: 6, ..NoiseSettings::default().with_fractal(fractal) };
        let noise = CoherentNoise::new(WorldSeed::new(42), settings);
        group.bench_function(name, |b| {
            let mut x = 0.0f64;
            b.iter(|| {
                x += 0.1;
                black_box(noise.sample(black_box(x), black_box(x * 0.7)))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_base_kinds, benchmark_million_samples, benchmark_fractals);
criterion_main!(benches);
