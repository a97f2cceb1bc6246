use crate::config::Config;
use crate::dataset::{ChoiceLists, ReferenceDataset};
use crate::errors::{AppError, ResultExt};
use crate::form::{self, FormValues, Outcome};
use crate::predictor::Predictor;
use crate::presenter::{self, PredictionResult};
use crate::schema::{CustomerRecord, FIELDS};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Largest accepted request body. A full form submission is well under 2 KiB.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state injected into handlers.
///
/// Everything here is loaded once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// The loaded classifier.
    pub predictor: Predictor,
    /// Reference dataset, when one is configured.
    pub dataset: Option<Arc<ReferenceDataset>>,
    /// Choice lists offered by the categorical widgets.
    pub choices: Arc<ChoiceLists>,
}

impl AppState {
    pub fn new(config: Config, predictor: Predictor, dataset: Option<ReferenceDataset>) -> Self {
        let choices = match &dataset {
            Some(ds) => ChoiceLists::from_dataset(ds),
            None => ChoiceLists::fixed(),
        };
        Self {
            config,
            predictor,
            dataset: dataset.map(Arc::new),
            choices: Arc::new(choices),
        }
    }

    fn dataset(&self) -> Result<&ReferenceDataset, AppError> {
        self.dataset
            .as_deref()
            .ok_or_else(|| AppError::NotFound("No reference dataset is configured".to_string()))
    }
}

/// Builds the full router with its middleware stack.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(show_form))
        .route("/predict", post(submit_form))
        .route("/export", post(export_result))
        .route("/dataset", get(show_dataset))
        .route("/api/v1/predict", post(predict_json))
        .route("/api/v1/schema", get(schema))
        .route("/api/v1/dataset/summary", get(dataset_summary))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .layer(CorsLayer::permissive())
}

/// Health check endpoint.
///
/// Returns the service status, version, and the loaded model.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "model": state.predictor.model_name(),
            "model_features": state.predictor.feature_names(),
            "dataset_rows": state.dataset.as_ref().map(|d| d.len()),
        })),
    )
}

/// GET /
///
/// Renders the empty form with its default values.
pub async fn show_form(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(
        form::form_page(
            &state.choices,
            &form::default_values(),
            None,
            state.dataset.is_some(),
        )
        .into_string(),
    )
}

fn submitted_values(pairs: &[(String, String)]) -> FormValues {
    pairs
        .iter()
        .filter(|(k, _)| FIELDS.iter().any(|f| f.name == k))
        .cloned()
        .collect()
}

fn run_prediction(
    state: &AppState,
    pairs: &[(String, String)],
) -> Result<(CustomerRecord, PredictionResult), AppError> {
    let record = CustomerRecord::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .map_err(|e| AppError::Inference(e.to_string()))?;
    let result = state.predictor.predict(&record)?;
    Ok((record, result))
}

/// POST /predict
///
/// Form submission. Failures are shown on the page next to the submitted
/// values rather than returned as an error status.
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Html<String> {
    let outcome = match run_prediction(&state, &pairs) {
        Ok((_, result)) => {
            tracing::info!("POST /predict - {}", result.summary());
            Outcome::Success(result)
        }
        Err(e) => {
            tracing::warn!("POST /predict failed: {}", e);
            Outcome::Failure(e.to_string())
        }
    };

    let mut values = form::default_values();
    values.extend(submitted_values(&pairs));
    Html(
        form::form_page(
            &state.choices,
            &values,
            Some(&outcome),
            state.dataset.is_some(),
        )
        .into_string(),
    )
}

/// POST /export
///
/// Re-runs the prediction for the submitted values and returns the record
/// with its result as a CSV download.
pub async fn export_result(
    State(state): State<Arc<AppState>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let (record, result) = run_prediction(&state, &pairs)?;
    let bytes = presenter::export_csv(&record, &result).context("Building CSV export")?;
    let file_name = presenter::export_file_name();
    tracing::info!("POST /export - {} ({} bytes)", file_name, bytes.len());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// GET /dataset
pub async fn show_dataset(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let dataset = state.dataset()?;
    let stats = dataset.describe();
    Ok(Html(
        form::dataset_page(dataset, state.config.preview_rows, &stats).into_string(),
    ))
}

/// POST /api/v1/predict
///
/// JSON counterpart of the form. `pdays` and `previous` may be omitted.
/// A body that does not decode into a record is an inference failure too.
pub async fn predict_json(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CustomerRecord>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(record) = payload.map_err(|rejection| AppError::Inference(rejection.body_text()))?;
    tracing::info!("POST /api/v1/predict - age={} job={}", record.age, record.job);
    let result = state.predictor.predict(&record)?;
    Ok(Json(json!({
        "label": result.label,
        "probability": result.probability,
        "summary": result.summary(),
    })))
}

/// GET /api/v1/schema
///
/// Field names, labels and domains, with the choice lists the form offers.
pub async fn schema(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "fields": FIELDS.iter().collect::<Vec<_>>(),
        "choices": &*state.choices,
        "export_columns": presenter::export_headers(),
    }))
}

/// GET /api/v1/dataset/summary
pub async fn dataset_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let dataset = state.dataset()?;
    Ok(Json(json!({
        "rows": dataset.len(),
        "columns": dataset.headers(),
        "describe": dataset.describe(),
    })))
}
