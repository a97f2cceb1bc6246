use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bank_subscription_predictor::config::Config;
use bank_subscription_predictor::dataset::ReferenceDataset;
use bank_subscription_predictor::handlers::{self, AppState};
use bank_subscription_predictor::model;
use bank_subscription_predictor::predictor::{self, Predictor};

/// Main entry point for the application.
///
/// Loads the configuration, the model artifact and the reference dataset, then
/// starts the Axum server. Any loading failure aborts before the listener binds,
/// so the form is never served without a model.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bank_subscription_predictor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let forest = model::load_artifact(&config.model_path)
        .with_context(|| format!("Failed to load model {}", config.model_path.display()))?;
    let unmatched = predictor::unmatched_features(&forest);
    if !unmatched.is_empty() {
        tracing::warn!(
            "Model features not provided by the form: {:?}; predictions will fail",
            unmatched
        );
    }
    let predictor = Predictor::new(forest);

    let dataset = match &config.dataset_path {
        Some(path) => Some(
            ReferenceDataset::load(path)
                .with_context(|| format!("Failed to load dataset {}", path.display()))?,
        ),
        None => None,
    };

    let addr = format!("{}:{}", config.bind_addr, config.port);
    let app_state = Arc::new(AppState::new(config, predictor, dataset));
    let app = handlers::app(app_state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
