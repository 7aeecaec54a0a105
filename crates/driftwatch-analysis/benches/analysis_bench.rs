use criterion::{criterion_group, criterion_main, Criterion};

use driftwatch_analysis::bucketing::{BucketModel, BucketingConfig};
use driftwatch_analysis::detectors::{Adwin, ChangeDetector, Ddm};
use driftwatch_analysis::divergence::{centroid_cost_matrix, transport_cost};
use driftwatch_core::config::{AdwinParams, DdmParams};
use driftwatch_core::models::Datum;

fn blobs(n: usize) -> Vec<Datum> {
    let centers = vec![vec![0.0; 16], vec![5.0; 16], vec![-5.0; 16]];
    test_fixtures::gaussian_blobs(1, &centers, 1.0, n)
        .into_iter()
        .map(Datum::Vector)
        .collect()
}

fn bench_kmeans_fit_1k(c: &mut Criterion) {
    let data = blobs(1_000);
    let config = BucketingConfig {
        is_embedding: true,
        ..BucketingConfig::default()
    };
    c.bench_function("kmeans_fit_1k_x16", |b| {
        b.iter(|| BucketModel::fit(&data, &config).unwrap())
    });
}

fn bench_assign_embedding(c: &mut Criterion) {
    let data = blobs(1_000);
    let mut model = BucketModel::fit(
        &data,
        &BucketingConfig {
            is_embedding: true,
            ..BucketingConfig::default()
        },
    )
    .unwrap();
    let queries = blobs(256);
    c.bench_function("assign_256_embeddings", |b| {
        b.iter(|| {
            for d in &queries {
                model.assign(d).unwrap();
            }
        })
    });
}

fn bench_transport_cost(c: &mut Criterion) {
    let model = BucketModel::fit(
        &blobs(1_000),
        &BucketingConfig {
            is_embedding: true,
            ..BucketingConfig::default()
        },
    )
    .unwrap();
    let costs = centroid_cost_matrix(&model.clusters(0));
    let reference = model.reference_distribution()[0].clone();
    let mut production = reference.clone();
    production.reverse();
    c.bench_function("transport_cost_20_buckets", |b| {
        b.iter(|| transport_cost(&production, &reference, &costs).unwrap())
    });
}

fn bench_detectors(c: &mut Criterion) {
    let stream = test_fixtures::error_stream(3, 10_000, 5_000, 0.05, 0.3);
    c.bench_function("ddm_10k_updates", |b| {
        b.iter(|| {
            let mut ddm = Ddm::new(DdmParams::default());
            for x in &stream {
                ddm.update(*x);
            }
        })
    });
    c.bench_function("adwin_10k_updates", |b| {
        b.iter(|| {
            let mut adwin = Adwin::new(AdwinParams::default());
            for x in &stream {
                adwin.update(*x);
            }
        })
    });
}

criterion_group!(
    benches,
    bench_kmeans_fit_1k,
    bench_assign_embedding,
    bench_transport_cost,
    bench_detectors
);
criterion_main!(benches);
