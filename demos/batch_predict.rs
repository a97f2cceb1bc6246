//! Scores every row of a CSV file with the configured model and writes the
//! rows back out with the `Prediksi` and `Probabilitas (%)` columns appended.
//!
//! Usage: cargo run --example batch_predict -- customers.csv > scored.csv

use anyhow::{Context, Result};
use bank_subscription_predictor::config::Config;
use bank_subscription_predictor::model;
use bank_subscription_predictor::predictor::Predictor;
use bank_subscription_predictor::presenter::{LABEL_COLUMN, PROBABILITY_COLUMN};
use bank_subscription_predictor::schema::CustomerRecord;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let input = std::env::args()
        .nth(1)
        .context("usage: batch_predict <customers.csv>")?;
    let config = Config::from_env()?;
    let predictor = Predictor::new(model::load_artifact(&config.model_path)?);

    let mut reader = csv::Reader::from_path(&input).with_context(|| format!("Failed to open {}", input))?;
    let headers = reader.headers()?.clone();
    let mut writer = csv::Writer::from_writer(std::io::stdout());

    let mut out_headers: Vec<&str> = headers.iter().collect();
    out_headers.extend([LABEL_COLUMN, PROBABILITY_COLUMN]);
    writer.write_record(&out_headers)?;

    let (mut scored, mut failed) = (0usize, 0usize);
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let outcome = CustomerRecord::from_pairs(headers.iter().zip(row.iter()))
            .map_err(anyhow::Error::from)
            .and_then(|record| predictor.predict(&record).map_err(anyhow::Error::from));

        let mut out: Vec<String> = row.iter().map(str::to_string).collect();
        match outcome {
            Ok(result) => {
                out.push(result.label.to_string());
                out.push(format!("{:.2}", result.probability));
                scored += 1;
            }
            Err(e) => {
                tracing::warn!("Row {}: {}", line + 2, e);
                out.extend([String::new(), String::new()]);
                failed += 1;
            }
        }
        writer.write_record(&out)?;
    }
    writer.flush()?;

    tracing::info!("Scored {} rows, {} failed", scored, failed);
    Ok(())
}
