//! Utility to inspect a model artifact and check it against the form schema.

use anyhow::Context;
use bank_subscription_predictor::config::DEFAULT_MODEL_PATH;
use bank_subscription_predictor::model::{self, Classifier};
use bank_subscription_predictor::predictor::{self, Predictor};
use bank_subscription_predictor::schema::CustomerRecord;

/// Main entry point for the model inspection utility.
///
/// Takes the artifact path as first argument, falling back to `MODEL_PATH` and
/// then `model_xgb.json`. Exits with an error when the model asks for features
/// the form cannot provide.
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MODEL_PATH").ok())
        .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());

    let forest = model::load_artifact(&path).with_context(|| format!("Failed to load {}", path))?;

    println!("Model: {}", path);
    println!("- {}", forest.name());
    println!("- features: {}", forest.num_features());
    for (i, name) in forest.feature_names().iter().enumerate() {
        println!("  {:>2}. {}", i, name);
    }

    let unused = predictor::unused_fields(&forest);
    if !unused.is_empty() {
        println!("Form fields ignored by the model: {}", unused.join(", "));
    }

    let unmatched = predictor::unmatched_features(&forest);
    if !unmatched.is_empty() {
        anyhow::bail!(
            "model expects features the form does not provide: {}",
            unmatched.join(", ")
        );
    }

    let result = Predictor::new(forest)
        .predict(&CustomerRecord::default())
        .context("Prediction on the default form values failed")?;
    println!("Default form values: {}", result.summary());

    Ok(())
}
