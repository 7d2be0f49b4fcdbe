//! Benchmarks for scoring, ranking and report aggregation.
//!
//! Run with: cargo bench -p clipsight-core

use std::sync::Arc;

use clipsight_core::classify::{classifier, scorer};
use clipsight_core::{Analyzer, FixedEmbedder};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::DynamicImage;

/// CLIP ViT-B/32 projection width.
const DIM: usize = 512;

fn unit_vector(seed: usize) -> Vec<f32> {
    let v: Vec<f32> = (0..DIM)
        .map(|i| ((i * 31 + seed * 17) % 97) as f32 - 48.0)
        .collect();
    clipsight_core::math::l2_normalize(&v)
}

fn benchmark_score(c: &mut Criterion) {
    let image = unit_vector(0);
    let labels: Vec<Vec<f32>> = (1..=74).map(unit_vector).collect();

    c.bench_function("score_74_labels", |b| {
        b.iter(|| {
            let _ = scorer::score(black_box(&image), black_box(&labels));
        })
    });
}

fn benchmark_rank(c: &mut Criterion) {
    let probabilities: Vec<f32> = (0..74).map(|i| (i % 13) as f32 / 74.0).collect();

    c.bench_function("rank_top5_of_74", |b| {
        b.iter(|| classifier::rank(black_box(&probabilities), 5))
    });
}

fn benchmark_food_report(c: &mut Criterion) {
    let analyzer = Analyzer::new(Arc::new(FixedEmbedder::new(DIM)), 64);
    if let Err(e) = analyzer.warm() {
        eprintln!("Skipping food report benchmark: {e}");
        return;
    }
    let vector = analyzer
        .embed_image(&DynamicImage::new_rgb8(1, 1))
        .unwrap();

    c.bench_function("food_report_warm_cache", |b| {
        b.iter(|| {
            let _ = analyzer.analyze_food(black_box(&vector));
        })
    });
}

criterion_group!(
    benches,
    benchmark_score,
    benchmark_rank,
    benchmark_food_report,
);
criterion_main!(benches);
