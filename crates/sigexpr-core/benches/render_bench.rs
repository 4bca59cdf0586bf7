//! Criterion benchmarks for expression compile and render
//!
//! Run with: cargo bench -p sigexpr-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sigexpr_core::{DiagnosticSink, ExprRenderer, ExpressionStore, Program};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

const EXPRESSIONS: &[(&str, &str)] = &[
    ("passthrough", "v0"),
    ("mix", "0.5 * (v0 + v1)"),
    ("ring_mod", "v0 * v1 * 2 - v2"),
    ("waveshaper", "tanh(4 * v0) * (1 - abs(v1)) + clamp(v2, -0.5, 0.5)"),
];

fn generate_channels(size: usize) -> Vec<Vec<f64>> {
    [440.0, 660.0, 110.0, 55.0]
        .iter()
        .map(|&freq| {
            (0..size)
                .map(|i| {
                    let t = i as f64 / SAMPLE_RATE;
                    (2.0 * std::f64::consts::PI * freq * t).sin() * 0.5
                })
                .collect()
        })
        .collect()
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("Render");

    for &(name, text) in EXPRESSIONS {
        for &block_size in BLOCK_SIZES {
            let channels = generate_channels(block_size);
            let slices: Vec<&[f64]> = channels.iter().map(Vec::as_slice).collect();

            group.bench_with_input(BenchmarkId::new(name, block_size), &block_size, |b, _| {
                let store = ExpressionStore::default();
                store.set(text).unwrap();
                let mut renderer = ExprRenderer::new(store, DiagnosticSink::disabled());
                let mut output = vec![0.0; block_size];
                b.iter(|| {
                    renderer.render(black_box(&slices), &mut output);
                    black_box(&output);
                });
            });
        }
    }

    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("Compile");

    for &(name, text) in EXPRESSIONS {
        group.bench_function(name, |b| {
            b.iter(|| black_box(Program::compile(black_box(text))));
        });
    }

    group.finish();
}

fn bench_set(c: &mut Criterion) {
    // Control-thread cost of a replacement, including retirement.
    c.bench_function("store_set", |b| {
        let store = ExpressionStore::default();
        b.iter(|| store.set(black_box("0.5 * (v0 + v1)")).unwrap());
    });
}

criterion_group!(benches, bench_render, bench_compile, bench_set);

criterion_main!(benches);
