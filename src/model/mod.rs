//! Pre-trained classifier artifacts.
//!
//! - `format`: serde types for the XGBoost JSON model file.
//! - `forest`: the converted tree ensemble and its evaluation.
//! - `loader`: reads an artifact from disk once at startup.

pub mod format;
pub mod forest;
pub mod loader;

pub use forest::{Forest, Objective};
pub use loader::load_artifact;

/// Errors raised while loading or evaluating a model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model artifact {path} could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact is not valid XGBoost JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported artifact format '{0}': export the booster with save_model(\"model_xgb.json\")")]
    UnsupportedFormat(String),
    #[error("unsupported objective '{0}': only binary classifiers can be served")]
    UnsupportedObjective(String),
    #[error("unsupported booster '{0}': only tree boosters can be served")]
    UnsupportedBooster(String),
    #[error("tree {0} has no nodes")]
    EmptyTree(usize),
    #[error("invalid node index in tree {tree}: node {node} references child {child}, expected a later node below {num_nodes}")]
    InvalidNodeIndex {
        tree: usize,
        node: usize,
        child: i32,
        num_nodes: usize,
    },
    #[error("malformed model: {0}")]
    Malformed(String),
    #[error("model expects {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
}

/// A binary classifier over a dense feature row.
///
/// `predict_proba` returns the positive-class probability in [0, 1];
/// `predict` thresholds it at 0.5 like a scikit-learn classifier.
pub trait Classifier: Send + Sync {
    /// Feature names in model column order; empty when the artifact has none.
    fn feature_names(&self) -> &[String];

    /// Number of input columns the model expects.
    fn num_features(&self) -> usize;

    fn predict_proba(&self, features: &[f32]) -> Result<f32, ModelError>;

    fn predict(&self, features: &[f32]) -> Result<u8, ModelError> {
        Ok(u8::from(self.predict_proba(features)? > 0.5))
    }

    /// Human readable description for logs and the health endpoint.
    fn name(&self) -> String {
        "classifier".to_string()
    }
}

impl Classifier for Forest {
    fn feature_names(&self) -> &[String] {
        Forest::feature_names(self)
    }

    fn num_features(&self) -> usize {
        self.num_feature()
    }

    fn predict_proba(&self, features: &[f32]) -> Result<f32, ModelError> {
        if features.len() != self.num_feature() {
            return Err(ModelError::FeatureCount {
                expected: self.num_feature(),
                actual: features.len(),
            });
        }
        let p = self.probability(features);
        if !p.is_finite() {
            return Err(ModelError::Malformed(format!(
                "model produced a non-finite probability ({})",
                p
            )));
        }
        Ok(p)
    }

    fn name(&self) -> String {
        format!(
            "xgboost {} ({}, {} trees)",
            self.booster(),
            self.objective().name(),
            self.num_trees()
        )
    }
}
