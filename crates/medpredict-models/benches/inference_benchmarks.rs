//! Inference latency benchmarks
//!
//! Covers the per-request path: artifact evaluation plus confidence
//! resolution, for each artifact kind.
//!
//! Run with: cargo bench -p medpredict-models

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use medpredict_core::FeatureVector;
use medpredict_models::confidence;
use medpredict_models::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn open(dir: &TempDir, name: &str, document: serde_json::Value) -> ModelArtifact {
    let path = dir.path().join(name);
    std::fs::write(&path, document.to_string()).expect("write fixture");
    ModelArtifact::open(name, &path).expect("open fixture")
}

fn benchmark_binary_models(c: &mut Criterion) {
    let dir = TempDir::new().expect("temp dir");
    let coef: Vec<f64> = (0..22).map(|i| (i as f64 - 11.0) / 10.0).collect();

    let artifacts = vec![
        (
            "logistic_regression",
            open(
                &dir,
                "lr.json",
                json!({"kind": "logistic_regression", "classes": [0, 1], "coef": [coef], "intercept": [0.1]}),
            ),
        ),
        (
            "linear_svc",
            open(
                &dir,
                "svc.json",
                json!({"kind": "linear_svc", "classes": [0, 1], "coef": [coef], "intercept": [0.1]}),
            ),
        ),
        (
            "nearest_centroid",
            open(
                &dir,
                "nc.json",
                json!({"kind": "nearest_centroid", "classes": [0, 1], "centroids": [vec![0.0; 22], vec![1.0; 22]]}),
            ),
        ),
    ];
    let features = FeatureVector::new(vec![0.5; 22]);

    let mut group = c.benchmark_group("Binary_Predict");
    group.sample_size(100);

    for (name, artifact) in &artifacts {
        group.bench_with_input(BenchmarkId::new("predict_risk", name), artifact, |b, artifact| {
            b.iter(|| predict_risk(black_box(artifact), black_box(&features)).expect("predict"))
        });
    }

    group.finish();
}

fn benchmark_confidence(c: &mut Criterion) {
    let caps = ArtifactKind::LogisticRegression.capabilities();
    let output = RawOutput {
        class: 1,
        probabilities: Some(vec![0.3, 0.7]),
        margin: Some(0.85),
        activations: None,
    };

    c.bench_function("confidence_resolve", |b| {
        b.iter(|| confidence::resolve(black_box(caps), black_box(&output)))
    });
}

criterion_group!(benches, benchmark_binary_models, benchmark_confidence);
criterion_main!(benches);
