//! Prediction results, their display text and the CSV export.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::{CustomerRecord, SchemaError, FIELDS};

/// Header of the predicted label column in the export.
pub const LABEL_COLUMN: &str = "Prediksi";
/// Header of the probability column in the export.
pub const PROBABILITY_COLUMN: &str = "Probabilitas (%)";

/// Will the customer subscribe?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Ya,
    Tidak,
}

impl Label {
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            Label::Ya
        } else {
            Label::Tidak
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Ya => write!(f, "Ya"),
            Label::Tidak => write!(f, "Tidak"),
        }
    }
}

impl std::str::FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Ya" => Ok(Label::Ya),
            "Tidak" => Ok(Label::Tidak),
            other => Err(format!("unknown label '{}'", other)),
        }
    }
}

/// Outcome of one prediction. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: Label,
    /// Positive-class probability in percent, within [0, 100].
    pub probability: f64,
}

impl PredictionResult {
    pub fn summary(&self) -> String {
        format!("Prediksi: {} ({:.2}%)", self.label, self.probability)
    }
}

/// Errors raised while writing or reading an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("export buffer error: {0}")]
    Buffer(String),
    #[error("export is missing column '{0}'")]
    MissingColumn(&'static str),
    #[error("export has no data row")]
    Empty,
    #[error("invalid value in export: {0}")]
    Invalid(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Header row of the export: every schema field, then the two derived columns.
pub fn export_headers() -> Vec<&'static str> {
    FIELDS
        .iter()
        .map(|f| f.name)
        .chain([LABEL_COLUMN, PROBABILITY_COLUMN])
        .collect()
}

/// Serializes the record with its prediction as a one-row CSV document.
///
/// The probability is written rounded to two decimals, the same precision the
/// result banner shows, so reading it back is exact only to within 0.005.
pub fn export_csv(record: &CustomerRecord, result: &PredictionResult) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(export_headers())?;

    let mut row: Vec<String> = record.to_pairs().into_iter().map(|(_, v)| v).collect();
    row.push(result.label.to_string());
    row.push(format!("{:.2}", result.probability));
    writer.write_record(&row)?;

    writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))
}

/// Reads back a document produced by [`export_csv`].
pub fn read_export(bytes: &[u8]) -> Result<(CustomerRecord, PredictionResult), ExportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();
    let row = reader.records().next().ok_or(ExportError::Empty)??;

    let column = |name: &'static str| -> Result<&str, ExportError> {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|i| row.get(i))
            .ok_or(ExportError::MissingColumn(name))
    };

    let record = CustomerRecord::from_pairs(headers.iter().zip(row.iter()))?;
    let label = column(LABEL_COLUMN)?
        .parse::<Label>()
        .map_err(ExportError::Invalid)?;
    let probability = column(PROBABILITY_COLUMN)?
        .trim()
        .parse::<f64>()
        .map_err(|e| ExportError::Invalid(e.to_string()))?;

    Ok((record, PredictionResult { label, probability }))
}

/// Suggested download file name, stamped with the current local time.
pub fn export_file_name() -> String {
    format!(
        "hasil_prediksi_{}.csv",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_uses_two_decimals() {
        let result = PredictionResult {
            label: Label::Ya,
            probability: 73.456,
        };
        assert_eq!(result.summary(), "Prediksi: Ya (73.46%)");
    }

    #[test]
    fn label_from_class() {
        assert_eq!(Label::from_class(1), Label::Ya);
        assert_eq!(Label::from_class(0), Label::Tidak);
        assert_eq!("Tidak".parse::<Label>(), Ok(Label::Tidak));
        assert!("maybe".parse::<Label>().is_err());
    }

    #[test]
    fn export_has_fields_then_derived_columns() {
        let record = CustomerRecord::default();
        let result = PredictionResult {
            label: Label::Tidak,
            probability: 12.5,
        };
        let bytes = export_csv(&record, &result).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("age,job,marital"));
        assert!(header.ends_with("Prediksi,Probabilitas (%)"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("30,admin.,single"));
        assert!(row.ends_with("Tidak,12.50"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn export_round_trips() {
        let mut record = CustomerRecord::default();
        record.job = "self-employed".into();
        record.cons_conf_idx = -42.7;
        let result = PredictionResult {
            label: Label::Ya,
            probability: 88.12,
        };
        let bytes = export_csv(&record, &result).unwrap();
        let (decoded, decoded_result) = read_export(&bytes).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded_result, result);
    }

    #[test]
    fn exported_probability_is_rounded_to_display_precision() {
        let result = PredictionResult {
            label: Label::Ya,
            probability: 73.456,
        };
        let bytes = export_csv(&CustomerRecord::default(), &result).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.trim_end().ends_with("Ya,73.46"));
        let (_, decoded) = read_export(&bytes).unwrap();
        assert_eq!(decoded.probability, 73.46);
    }

    #[test]
    fn read_export_reports_missing_columns() {
        let err = read_export(b"age\n30\n").unwrap_err();
        assert!(matches!(err, ExportError::Schema(_)));

        let err = read_export(b"").unwrap_err();
        assert!(matches!(err, ExportError::Empty));
    }
}
