use std::path::Path;

use super::format::XgbModel;
use super::{Forest, ModelError};

/// Loads the classifier artifact at `path`.
///
/// Only XGBoost JSON models are understood. Pickled scikit-learn pipelines
/// (`*.pkl`, `*.joblib`) are rejected up front with a hint on how to export
/// the booster instead.
pub fn load_artifact(path: impl AsRef<Path>) -> Result<Forest, ModelError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if matches!(extension.as_str(), "pkl" | "pickle" | "joblib" | "ubj") {
        return Err(ModelError::UnsupportedFormat(extension));
    }

    let raw = std::fs::read(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let document: XgbModel = serde_json::from_slice(&raw)?;
    if !document.version.is_empty() {
        tracing::debug!("Model written by XGBoost {:?}", document.version);
    }

    let forest = Forest::from_xgboost(&document)?;
    tracing::info!(
        "Loaded model {}: {} trees, {} features, objective {}",
        path.display(),
        forest.num_trees(),
        forest.num_feature(),
        forest.objective().name()
    );
    if forest.feature_names().is_empty() {
        tracing::warn!("Model carries no feature names; canonical column order will be assumed");
    }

    Ok(forest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_artifact("/definitely/not/here/model_xgb.json").unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }

    #[test]
    fn pickles_are_rejected_before_reading() {
        let err = load_artifact("best_xgb_model.pkl").unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedFormat(ref e) if e == "pkl"));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(b"{not json").unwrap();
        let err = load_artifact(file.path()).unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }
}
