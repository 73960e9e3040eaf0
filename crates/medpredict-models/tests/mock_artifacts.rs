//! Registry, prediction and arbitration against small on-disk fixtures
//!
//! Fixtures are native JSON documents written into a temp directory, so the
//! whole path from file to labeled result is exercised.

use medpredict_core::{ConfidenceTier, Error, FeatureVector};
use medpredict_models::prelude::*;
use medpredict_models::{ModelSpec, ModelsConfig, COMMON_PRIMARY_KEY, COMMON_SECONDARY_KEY};
use medpredict_core::Domain;
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for artifact fixture files
struct MockArtifact {
    document: serde_json::Value,
}

impl MockArtifact {
    fn logistic(coef: Vec<f64>, intercept: f64) -> Self {
        Self {
            document: json!({
                "kind": "logistic_regression",
                "classes": [0, 1],
                "coef": [coef],
                "intercept": [intercept],
            }),
        }
    }

    fn svc(coef: Vec<f64>, intercept: f64) -> Self {
        Self {
            document: json!({
                "kind": "linear_svc",
                "classes": [0, 1],
                "coef": [coef],
                "intercept": [intercept],
            }),
        }
    }

    fn centroid(centroids: Vec<Vec<f64>>) -> Self {
        let classes: Vec<i64> = (0..centroids.len() as i64).collect();
        Self {
            document: json!({
                "kind": "nearest_centroid",
                "classes": classes,
                "centroids": centroids,
            }),
        }
    }

    fn multiclass_logistic(coef: Vec<Vec<f64>>) -> Self {
        let classes: Vec<i64> = (0..coef.len() as i64).collect();
        let intercept = vec![0.0; coef.len()];
        Self {
            document: json!({
                "kind": "logistic_regression",
                "classes": classes,
                "coef": coef,
                "intercept": intercept,
            }),
        }
    }

    fn softmax_net(weights: Vec<Vec<f64>>) -> Self {
        let bias = vec![0.0; weights.len()];
        Self {
            document: json!({
                "kind": "sequential",
                "layers": [{"weights": weights, "bias": bias, "activation": "softmax"}],
            }),
        }
    }

    fn with_declared_arity(mut self, n: usize) -> Self {
        self.document["n_features_in"] = json!(n);
        self
    }

    fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_vec(&self.document).unwrap()).unwrap();
        path
    }
}

#[test]
fn test_static_default_for_positive_class_without_capabilities() {
    let dir = TempDir::new().unwrap();
    let path = MockArtifact::centroid(vec![vec![0.0; 8], vec![5.0; 8]]).write(dir.path(), "d.json");

    let mut registry = ModelRegistry::new();
    let artifact = registry.load("diabetes", &path).unwrap();

    let prediction = predict_risk(&artifact, &FeatureVector::new(vec![4.0; 8])).unwrap();
    assert!(prediction.high_risk);
    assert_eq!(prediction.result.label, "High Risk");
    assert_eq!(prediction.result.confidence, 85.0);
    assert_eq!(prediction.result.provenance, ConfidenceTier::StaticDefault);
    assert_eq!(prediction.risk_level(), "high");

    let prediction = predict_risk(&artifact, &FeatureVector::zeros(8)).unwrap();
    assert_eq!(prediction.result.label, "Low Risk");
    assert_eq!(prediction.result.confidence, 75.0);
}

#[test]
fn test_logistic_confidence_from_probability() {
    let dir = TempDir::new().unwrap();
    let path = MockArtifact::logistic(vec![1.0, 0.0], 0.0).write(dir.path(), "h.json");

    let mut registry = ModelRegistry::new();
    let artifact = registry.load("heart", &path).unwrap();
    let prediction = predict_risk(&artifact, &FeatureVector::new(vec![2.0, 9.0])).unwrap();

    let expected = 100.0 / (1.0 + (-2.0f64).exp());
    assert!((prediction.result.confidence - expected).abs() < 1e-9);
    assert_eq!(prediction.result.provenance, ConfidenceTier::Probability);
}

#[test]
fn test_svc_confidence_from_margin() {
    let dir = TempDir::new().unwrap();
    let path = MockArtifact::svc(vec![0.5, 0.5], -0.75).write(dir.path(), "p.json");

    let mut registry = ModelRegistry::new();
    let artifact = registry.load("parkinsons", &path).unwrap();

    // margin 0.5 + 0.5 - 0.75 = 0.25 -> p = 0.8
    let prediction = predict_risk(&artifact, &FeatureVector::new(vec![1.0, 1.0])).unwrap();
    assert!(prediction.high_risk);
    assert!((prediction.result.confidence - 80.0).abs() < 1e-9);
    assert_eq!(prediction.result.provenance, ConfidenceTier::Margin);
}

#[test]
fn test_arity_mismatch_on_infer() {
    let dir = TempDir::new().unwrap();
    let path = MockArtifact::logistic(vec![1.0, 1.0, 1.0], 0.0)
        .with_declared_arity(3)
        .write(dir.path(), "h.json");

    let mut registry = ModelRegistry::new();
    let artifact = registry.load("heart", &path).unwrap();
    let err = predict_risk(&artifact, &FeatureVector::zeros(13)).unwrap_err();

    assert!(matches!(
        err,
        Error::ArityMismatch {
            expected: 3,
            actual: 13,
            ..
        }
    ));
}

#[test]
fn test_declared_arity_must_match_width() {
    let dir = TempDir::new().unwrap();
    let path = MockArtifact::svc(vec![1.0, 1.0], 0.0)
        .with_declared_arity(13)
        .write(dir.path(), "h.json");

    let mut registry = ModelRegistry::new();
    let err = registry.load("heart", &path).unwrap_err();
    assert!(matches!(
        err,
        Error::ArityMismatch {
            expected: 13,
            actual: 2,
            ..
        }
    ));
    assert!(!registry.has_model("heart"));
    assert!(registry.load_error("heart").unwrap().contains("arity mismatch"));
}

#[test]
fn test_declared_arity_matching_width_loads() {
    let dir = TempDir::new().unwrap();
    let path = MockArtifact::svc(vec![1.0, 1.0], 0.0)
        .with_declared_arity(2)
        .write(dir.path(), "h.json");

    let artifact = ModelArtifact::open("heart", &path).unwrap();
    assert_eq!(artifact.declared_arity(), Some(2));
    assert_eq!(artifact.input_width(), Some(2));
    assert_eq!(artifact.arity(), Some(2));
}

fn common_fixture(dir: &Path, secondary_weights: Vec<Vec<f64>>) -> ModelRegistry {
    let logistic = MockArtifact::multiclass_logistic(vec![
        vec![2.0, 0.0, 0.0],
        vec![0.0, 2.0, 0.0],
        vec![0.0, 0.0, 2.0],
    ])
    .write(dir, "logistic_regression_model.json");
    let neural = MockArtifact::softmax_net(secondary_weights).write(dir, "neural_network_model.json");
    std::fs::write(dir.join("encoder.json"), r#"{"classes":["Common Cold","Flu","Migraine"]}"#).unwrap();
    std::fs::write(dir.join("symptom_columns.json"), r#"["cough","fever","headache"]"#).unwrap();

    let config = ModelsConfig {
        base_dir: dir.to_path_buf(),
        models: [
            (
                COMMON_PRIMARY_KEY.to_string(),
                ModelSpec::new(logistic, Domain::Common),
            ),
            (
                COMMON_SECONDARY_KEY.to_string(),
                ModelSpec::new(neural, Domain::Common),
            ),
        ]
        .into_iter()
        .collect(),
        auxiliary: medpredict_models::AuxiliarySpec {
            encoder: Some("encoder.json".into()),
            symptom_columns: Some("symptom_columns.json".into()),
        },
    };

    ModelRegistry::load_required(&config).unwrap()
}

#[test]
fn test_arbitration_prefers_more_confident_network() {
    let dir = TempDir::new().unwrap();
    // a very sharp network is more confident than the logistic model
    let registry = common_fixture(
        dir.path(),
        vec![
            vec![0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0],
            vec![0.0, 0.0, 20.0],
        ],
    );

    let primary = registry.get(COMMON_PRIMARY_KEY).unwrap();
    let secondary = registry.get(COMMON_SECONDARY_KEY).unwrap();
    let encoder = registry.label_encoder().unwrap();

    let features = FeatureVector::new(vec![0.0, 0.0, 1.0]);
    let result = arbitrate(&primary, &secondary, &encoder, &features).unwrap();

    assert_eq!(result.label, "Migraine");
    assert_eq!(result.model_used.as_deref(), Some("neural"));
    assert_eq!(result.provenance, ConfidenceTier::OutputVector);
    assert!(result.confidence > 99.0 && result.confidence <= 100.0);
}

#[test]
fn test_arbitration_keeps_logistic_when_network_is_flat() {
    let dir = TempDir::new().unwrap();
    let registry = common_fixture(dir.path(), vec![vec![0.0; 3]; 3]);

    let primary = registry.get(COMMON_PRIMARY_KEY).unwrap();
    let secondary = registry.get(COMMON_SECONDARY_KEY).unwrap();
    let encoder = registry.label_encoder().unwrap();

    let features = FeatureVector::new(vec![0.0, 1.0, 0.0]);
    let result = arbitrate(&primary, &secondary, &encoder, &features).unwrap();

    assert_eq!(result.label, "Flu");
    assert_eq!(result.model_used.as_deref(), Some("logistic"));
    assert_eq!(result.provenance, ConfidenceTier::Probability);
}

#[test]
fn test_status_includes_auxiliary_entries() {
    let dir = TempDir::new().unwrap();
    let registry = common_fixture(dir.path(), vec![vec![0.0; 3]; 3]);

    let status = registry.status();
    assert_eq!(status.len(), 4);
    assert!(status.values().all(|loaded| *loaded));
    assert_eq!(registry.symptom_table().unwrap().len(), 3);
}

#[test]
fn test_portable_copy_predicts_identically() {
    let dir = TempDir::new().unwrap();
    let native = MockArtifact::logistic(vec![0.3, -0.2, 0.9, 0.1], -0.4).write(dir.path(), "m.json");
    let portable = dir.path().join("m.safetensors");

    let original = ModelArtifact::open("heart", &native).unwrap();
    original.write_portable(4, &portable).unwrap();
    let restored = ModelArtifact::open("heart", &portable).unwrap();

    for x in [
        vec![0.0, 0.0, 0.0, 0.0],
        vec![1.0, 2.0, 3.0, 4.0],
        vec![-1.0, 0.5, 0.25, 8.0],
    ] {
        let features = FeatureVector::new(x);
        let a = predict_risk(&original, &features).unwrap();
        let b = predict_risk(&restored, &features).unwrap();
        assert_eq!(a.result.label, b.result.label);
        assert_eq!(a.result.confidence, b.result.confidence);
    }
}

#[test]
fn test_sequential_is_not_convertible() {
    let dir = TempDir::new().unwrap();
    let path = MockArtifact::softmax_net(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).write(dir.path(), "n.json");
    let artifact = ModelArtifact::open(COMMON_SECONDARY_KEY, &path).unwrap();

    let err = artifact
        .write_portable(2, dir.path().join("n.safetensors"))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedArtifactKind { .. }));
}
