//! Runs one customer record through the loaded classifier.

use std::sync::Arc;

use crate::model::{Classifier, ModelError};
use crate::presenter::{Label, PredictionResult};
use crate::schema::{CustomerRecord, EncodedRecord, SchemaError, FIELDS, FIELD_COUNT};

/// Anything that goes wrong between a submitted record and a result.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("model expects feature '{0}' which the customer record does not provide")]
    UnknownFeature(String),
}

/// Shared handle on the classifier loaded at startup.
#[derive(Clone)]
pub struct Predictor {
    model: Arc<dyn Classifier>,
}

impl Predictor {
    pub fn new(model: impl Classifier + 'static) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn model_name(&self) -> String {
        self.model.name()
    }

    pub fn feature_names(&self) -> &[String] {
        self.model.feature_names()
    }

    /// Orders encoded values the way the model expects them.
    ///
    /// Named models are matched by feature name. Unnamed models get the
    /// canonical column order, which only works when the column counts agree.
    fn arrange(&self, encoded: &EncodedRecord) -> Result<Vec<f32>, InferenceError> {
        let names = self.model.feature_names();
        if names.is_empty() {
            let expected = self.model.num_features();
            if expected != FIELD_COUNT {
                return Err(ModelError::FeatureCount {
                    expected,
                    actual: FIELD_COUNT,
                }
                .into());
            }
            return Ok(encoded.as_slice().to_vec());
        }
        names
            .iter()
            .map(|name| {
                encoded
                    .get(name)
                    .ok_or_else(|| InferenceError::UnknownFeature(name.clone()))
            })
            .collect()
    }

    /// Predicts the label and positive-class probability for `record`.
    pub fn predict(&self, record: &CustomerRecord) -> Result<PredictionResult, InferenceError> {
        let encoded = record.encode()?;
        let features = self.arrange(&encoded)?;

        let class = self.model.predict(&features)?;
        let probability = f64::from(self.model.predict_proba(&features)?) * 100.0;
        let result = PredictionResult {
            label: Label::from_class(class),
            probability: probability.clamp(0.0, 100.0),
        };

        tracing::debug!(
            "Predicted {} for age={} job={} ({} features)",
            result.summary(),
            record.age,
            record.job,
            features.len()
        );
        Ok(result)
    }
}

/// Checks that every feature a model names is provided by the schema.
///
/// Returns the names the schema cannot supply.
pub fn unmatched_features(model: &dyn Classifier) -> Vec<String> {
    model
        .feature_names()
        .iter()
        .filter(|name| crate::schema::field(name).is_none())
        .cloned()
        .collect()
}

/// Schema fields the model does not look at.
pub fn unused_fields(model: &dyn Classifier) -> Vec<&'static str> {
    let names = model.feature_names();
    if names.is_empty() {
        return Vec::new();
    }
    FIELDS
        .iter()
        .filter(|f| {
            !names
                .iter()
                .any(|n| crate::schema::field(n).is_some_and(|s| s.name == f.name))
        })
        .map(|f| f.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Classifier returning a fixed probability and recording nothing.
    struct Fixed {
        names: Vec<String>,
        count: usize,
        p: f32,
    }

    impl Classifier for Fixed {
        fn feature_names(&self) -> &[String] {
            &self.names
        }
        fn num_features(&self) -> usize {
            self.count
        }
        fn predict_proba(&self, features: &[f32]) -> Result<f32, ModelError> {
            if features.len() != self.count {
                return Err(ModelError::FeatureCount {
                    expected: self.count,
                    actual: features.len(),
                });
            }
            Ok(self.p)
        }
    }

    fn named(names: &[&str], p: f32) -> Predictor {
        Predictor::new(Fixed {
            names: names.iter().map(|s| s.to_string()).collect(),
            count: names.len(),
            p,
        })
    }

    #[test]
    fn label_follows_probability() {
        let yes = named(&["age", "job"], 0.8).predict(&CustomerRecord::default()).unwrap();
        assert_eq!(yes.label, Label::Ya);
        assert!((yes.probability - 80.0).abs() < 1e-4);

        let no = named(&["age"], 0.2).predict(&CustomerRecord::default()).unwrap();
        assert_eq!(no.label, Label::Tidak);
    }

    #[test]
    fn unknown_model_feature_is_an_inference_error() {
        let err = named(&["age", "salary"], 0.5)
            .predict(&CustomerRecord::default())
            .unwrap_err();
        assert!(matches!(err, InferenceError::UnknownFeature(ref n) if n == "salary"));
    }

    #[test]
    fn unnamed_model_needs_matching_width() {
        let narrow = Predictor::new(Fixed {
            names: Vec::new(),
            count: 18,
            p: 0.5,
        });
        let err = narrow.predict(&CustomerRecord::default()).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::Model(ModelError::FeatureCount { expected: 18, actual: 20 })
        ));

        let full = Predictor::new(Fixed {
            names: Vec::new(),
            count: FIELD_COUNT,
            p: 0.5,
        });
        assert_eq!(full.predict(&CustomerRecord::default()).unwrap().label, Label::Tidak);
    }

    #[test]
    fn encoding_failure_surfaces() {
        let mut record = CustomerRecord::default();
        record.job = "CEO".into();
        let err = named(&["job"], 0.9).predict(&record).unwrap_err();
        assert_eq!(err.to_string(), "field 'job' has no encoding for 'CEO'");
    }

    #[test]
    fn feature_coverage_helpers() {
        let model = Fixed {
            names: vec!["age".into(), "emp.var.rate".into(), "balance".into()],
            count: 3,
            p: 0.1,
        };
        assert_eq!(unmatched_features(&model), vec!["balance".to_string()]);
        let unused = unused_fields(&model);
        assert!(!unused.contains(&"age"));
        assert!(!unused.contains(&"emp_var_rate"));
        assert!(unused.contains(&"job"));
    }
}
