//! Read-only reference dataset: preview rows, descriptive statistics and the
//! categorical choice lists offered by the form.

use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::schema::{FieldKind, FIELDS};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("reference dataset {path} could not be read: {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("reference dataset {0} has no header row")]
    NoHeader(String),
}

/// Pandas-style `describe()` of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q1: f64,
    #[serde(rename = "50%")]
    pub median: f64,
    #[serde(rename = "75%")]
    pub q3: f64,
    pub max: f64,
}

/// The reference CSV held in memory for the life of the process.
#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ReferenceDataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|source| DatasetError::Read {
                path: shown.clone(),
                source,
            })?;
        let dataset = Self::from_reader(reader).map_err(|source| DatasetError::Read {
            path: shown.clone(),
            source,
        })?;
        if dataset.headers.is_empty() {
            return Err(DatasetError::NoHeader(shown));
        }
        tracing::info!(
            "Loaded reference dataset {}: {} rows, {} columns",
            shown,
            dataset.rows.len(),
            dataset.headers.len()
        );
        Ok(dataset)
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, csv::Error> {
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let rows = reader
            .records()
            .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()?;
        Ok(Self { headers, rows })
    }

    /// Parses CSV text held in memory.
    pub fn from_csv_str(text: &str) -> Result<Self, csv::Error> {
        Self::from_reader(
            csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .from_reader(text.as_bytes()),
        )
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .or_else(|| {
                self.headers
                    .iter()
                    .position(|h| crate::schema::field(h).is_some_and(|f| f.name == name))
            })
    }

    fn column(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(move |row| row.get(idx).map(|v| v.trim()))
            .filter(|v| !v.is_empty())
    }

    /// Summaries of every column whose non-empty values are all numeric.
    pub fn describe(&self) -> Vec<ColumnSummary> {
        self.headers
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| {
                let values: Option<Vec<f64>> =
                    self.column(idx).map(|v| v.parse::<f64>().ok()).collect();
                summarize(name, values?)
            })
            .collect()
    }

    /// Distinct values of a schema column in first-seen order.
    pub fn distinct(&self, name: &str) -> Vec<String> {
        let Some(idx) = self.column_index(name) else {
            return Vec::new();
        };
        let mut seen = Vec::new();
        for value in self.column(idx) {
            if !seen.iter().any(|s: &String| s == value) {
                seen.push(value.to_string());
            }
        }
        seen
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn summarize(name: &str, mut values: Vec<f64>) -> Option<ColumnSummary> {
    if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
    } else {
        f64::NAN
    };
    Some(ColumnSummary {
        column: name.to_string(),
        count,
        mean,
        std,
        min: values[0],
        q1: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q3: quantile(&values, 0.75),
        max: values[count - 1],
    })
}

/// Choice list per categorical field, as offered by the form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChoiceLists {
    lists: HashMap<&'static str, Vec<String>>,
}

impl ChoiceLists {
    /// The fixed lists declared by the schema.
    pub fn fixed() -> Self {
        let lists = FIELDS
            .iter()
            .filter_map(|spec| match spec.kind {
                FieldKind::Categorical { choices, .. } => Some((
                    spec.name,
                    choices.iter().map(|c| c.value.to_string()).collect(),
                )),
                _ => None,
            })
            .collect();
        Self { lists }
    }

    /// Lists derived from the dataset, restricted to values the encoder knows.
    ///
    /// A field whose column is absent, or holds no known value, keeps its
    /// fixed list.
    pub fn from_dataset(dataset: &ReferenceDataset) -> Self {
        let mut lists = Self::fixed();
        for spec in FIELDS.iter().filter(|f| f.is_categorical()) {
            let derived: Vec<String> = dataset
                .distinct(spec.name)
                .into_iter()
                .filter(|v| spec.code_of(v).is_some())
                .collect();
            if derived.is_empty() {
                tracing::debug!("No dataset values for '{}', keeping fixed choices", spec.name);
                continue;
            }
            lists.lists.insert(spec.name, derived);
        }
        lists
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.lists.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}
