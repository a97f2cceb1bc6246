use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::predictor::InferenceError;
use crate::presenter::ExportError;

/// Prefix of every user-facing inference failure.
pub const INFERENCE_FAILURE_PREFIX: &str = "Gagal memproses prediksi";

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Preparing the input or calling the model failed.
    Inference(String),
    /// Resource not found error.
    NotFound(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Inference(msg) => write!(f, "{}: {}", INFERENCE_FAILURE_PREFIX, msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl IntoResponse for AppError {
    /// Maps each error variant to an HTTP status code and a JSON body.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Inference(_) => {
                tracing::warn!("{}", self);
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return (**source).clone().into_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::Inference(err.to_string())
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T, E: Into<AppError>> ResultExt<T> for Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: context.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaError;

    #[test]
    fn inference_failure_message_carries_cause() {
        let err: AppError = InferenceError::from(SchemaError::UnknownCategory {
            field: "job".into(),
            value: "CEO".into(),
        })
        .into();
        assert_eq!(
            err.to_string(),
            "Gagal memproses prediksi: field 'job' has no encoding for 'CEO'"
        );
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn context_delegates_status_to_source() {
        let result: Result<(), AppError> = Err(AppError::NotFound("dataset".into()));
        let err = result.context("rendering preview").unwrap_err();
        assert_eq!(err.to_string(), "rendering preview: Not found: dataset");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
