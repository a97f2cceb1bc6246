//! Canonical customer schema shared by every entry point.
//!
//! The form, the JSON API, the CSV export and the predictor all read field
//! names, domains and categorical codes from [`FIELDS`]. Nothing else in the
//! crate knows how a categorical value becomes an integer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A categorical value together with its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub code: i32,
}

const fn choice(value: &'static str, code: i32) -> Choice {
    Choice { value, code }
}

/// Domain of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Integer { min: i64, max: i64, default: i64 },
    Real { min: f64, max: f64, default: f64, step: f64 },
    Categorical { choices: &'static [Choice], default: &'static str },
}

/// Declaration of one field of the customer record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Column name, also the feature name the model is looked up by.
    pub name: &'static str,
    /// Label shown next to the form widget.
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FieldKind::Categorical { .. })
    }

    /// Categorical code for `value`, or `None` when the value is outside the table.
    pub fn code_of(&self, value: &str) -> Option<i32> {
        match self.kind {
            FieldKind::Categorical { choices, .. } => {
                choices.iter().find(|c| c.value == value).map(|c| c.code)
            }
            _ => None,
        }
    }
}

const JOBS: &[Choice] = &[
    choice("admin.", 0),
    choice("blue-collar", 1),
    choice("entrepreneur", 2),
    choice("housemaid", 3),
    choice("management", 4),
    choice("retired", 5),
    choice("self-employed", 6),
    choice("services", 7),
    choice("student", 8),
    choice("technician", 9),
    choice("unemployed", 10),
    choice("unknown", 11),
];

const MARITAL: &[Choice] = &[
    choice("single", 0),
    choice("married", 1),
    choice("divorced", 2),
    choice("unknown", 3),
];

const EDUCATION: &[Choice] = &[
    choice("illiterate", 0),
    choice("basic.4y", 1),
    choice("basic.6y", 2),
    choice("basic.9y", 3),
    choice("high.school", 4),
    choice("professional.course", 5),
    choice("university.degree", 6),
];

const YES_NO_UNKNOWN: &[Choice] = &[choice("yes", 1), choice("no", 0), choice("unknown", -1)];

const CONTACT: &[Choice] = &[choice("cellular", 0), choice("telephone", 1)];

const MONTHS: &[Choice] = &[
    choice("jan", 0),
    choice("feb", 1),
    choice("mar", 2),
    choice("apr", 3),
    choice("may", 4),
    choice("jun", 5),
    choice("jul", 6),
    choice("aug", 7),
    choice("sep", 8),
    choice("oct", 9),
    choice("nov", 10),
    choice("dec", 11),
];

const DAYS: &[Choice] = &[
    choice("mon", 0),
    choice("tue", 1),
    choice("wed", 2),
    choice("thu", 3),
    choice("fri", 4),
];

const POUTCOME: &[Choice] = &[
    choice("failure", 0),
    choice("nonexistent", 1),
    choice("success", 2),
];

const fn integer(name: &'static str, label: &'static str, min: i64, max: i64, default: i64) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Integer { min, max, default },
    }
}

const fn real(name: &'static str, label: &'static str, min: f64, max: f64, default: f64) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Real {
            min,
            max,
            default,
            step: 0.01,
        },
    }
}

const fn categorical(name: &'static str, label: &'static str, choices: &'static [Choice]) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Categorical {
            choices,
            default: choices[0].value,
        },
    }
}

/// Number of fields in the canonical schema.
pub const FIELD_COUNT: usize = 20;

/// The canonical schema, in model column order.
pub static FIELDS: [FieldSpec; FIELD_COUNT] = [
    integer("age", "Usia", 18, 100, 30),
    categorical("job", "Pekerjaan", JOBS),
    categorical("marital", "Status Pernikahan", MARITAL),
    categorical("education", "Pendidikan", EDUCATION),
    categorical("default", "Memiliki Kredit Macet?", YES_NO_UNKNOWN),
    categorical("housing", "Memiliki Pinjaman Rumah?", YES_NO_UNKNOWN),
    categorical("loan", "Memiliki Pinjaman Pribadi?", YES_NO_UNKNOWN),
    categorical("contact", "Jenis Kontak", CONTACT),
    categorical("month", "Bulan Kontak Terakhir", MONTHS),
    categorical("day_of_week", "Hari Kontak Terakhir", DAYS),
    integer("duration", "Durasi Kontak (detik)", 0, 5000, 100),
    integer("campaign", "Jumlah Kontak dalam Kampanye Ini", 1, 50, 1),
    integer("pdays", "Hari Sejak Kontak Sebelumnya", 0, 999, 999),
    integer("previous", "Jumlah Kontak Sebelumnya", 0, 100, 0),
    categorical("poutcome", "Hasil Kontak Sebelumnya", POUTCOME),
    real("emp_var_rate", "Variasi Tingkat Kerja", -3.0, 3.0, 1.1),
    real("cons_price_idx", "Indeks Harga Konsumen", 90.0, 100.0, 93.2),
    real("cons_conf_idx", "Indeks Kepercayaan Konsumen", -50.0, 0.0, -36.4),
    real("euribor3m", "Tingkat Euribor 3 Bulan", 0.0, 6.0, 4.8),
    real("nr_employed", "Jumlah Pegawai", 4000.0, 5500.0, 5191.0),
];

/// Looks a field up by name.
///
/// Dotted column names from the raw bank-marketing dataset (`emp.var.rate`)
/// resolve to their underscored schema names.
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    let name = name.trim();
    FIELDS
        .iter()
        .find(|f| f.name == name)
        .or_else(|| FIELDS.iter().find(|f| f.name == name.replace('.', "_")))
}

/// Position of a field in the canonical column order.
pub fn position(name: &str) -> Option<usize> {
    let spec = field(name)?;
    FIELDS.iter().position(|f| f.name == spec.name)
}

/// Errors raised while reading or encoding a customer record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("field '{0}' is missing")]
    MissingField(String),
    #[error("field '{field}' expects a number, got '{value}'")]
    NotANumber { field: String, value: String },
    #[error("field '{field}' = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("field '{field}' has no encoding for '{value}'")]
    UnknownCategory { field: String, value: String },
}

/// Value of one field, borrowed from a [`CustomerRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Integer(i64),
    Real(f64),
    Text(&'a str),
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Real(v) => write!(f, "{}", v),
            FieldValue::Text(v) => write!(f, "{}", v),
        }
    }
}

fn default_pdays() -> i64 {
    999
}

fn default_previous() -> i64 {
    0
}

/// One prospective customer, as submitted through the form or the API.
///
/// Categorical fields stay as text until [`CustomerRecord::encode`] runs, so an
/// unknown category is reported by the encoder rather than by deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub age: i64,
    pub job: String,
    pub marital: String,
    pub education: String,
    pub default: String,
    pub housing: String,
    pub loan: String,
    pub contact: String,
    pub month: String,
    pub day_of_week: String,
    pub duration: i64,
    pub campaign: i64,
    #[serde(default = "default_pdays")]
    pub pdays: i64,
    #[serde(default = "default_previous")]
    pub previous: i64,
    pub poutcome: String,
    pub emp_var_rate: f64,
    pub cons_price_idx: f64,
    pub cons_conf_idx: f64,
    pub euribor3m: f64,
    pub nr_employed: f64,
}

impl Default for CustomerRecord {
    /// The values the form shows before the user touches it.
    fn default() -> Self {
        Self {
            age: 30,
            job: "admin.".to_string(),
            marital: "single".to_string(),
            education: "illiterate".to_string(),
            default: "yes".to_string(),
            housing: "yes".to_string(),
            loan: "yes".to_string(),
            contact: "cellular".to_string(),
            month: "jan".to_string(),
            day_of_week: "mon".to_string(),
            duration: 100,
            campaign: 1,
            pdays: default_pdays(),
            previous: default_previous(),
            poutcome: "failure".to_string(),
            emp_var_rate: 1.1,
            cons_price_idx: 93.2,
            cons_conf_idx: -36.4,
            euribor3m: 4.8,
            nr_employed: 5191.0,
        }
    }
}

impl CustomerRecord {
    /// Builds a record from `name = value` pairs (form bodies, CSV rows).
    ///
    /// Unknown names are ignored. `pdays` and `previous` fall back to their
    /// defaults; every other field must be present. Domains are not checked here.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let values: HashMap<&str, &str> = pairs
            .into_iter()
            .filter_map(|(k, v)| field(k).map(|spec| (spec.name, v.trim())))
            .collect();

        let text = |name: &str| -> Result<String, SchemaError> {
            values
                .get(name)
                .map(|v| v.to_string())
                .ok_or_else(|| SchemaError::MissingField(name.to_string()))
        };
        let int = |name: &str, fallback: Option<i64>| -> Result<i64, SchemaError> {
            match values.get(name) {
                Some(v) => v.parse::<i64>().map_err(|_| SchemaError::NotANumber {
                    field: name.to_string(),
                    value: v.to_string(),
                }),
                None => fallback.ok_or_else(|| SchemaError::MissingField(name.to_string())),
            }
        };
        let num = |name: &str| -> Result<f64, SchemaError> {
            let v = values
                .get(name)
                .ok_or_else(|| SchemaError::MissingField(name.to_string()))?;
            v.parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| SchemaError::NotANumber {
                    field: name.to_string(),
                    value: v.to_string(),
                })
        };

        Ok(Self {
            age: int("age", None)?,
            job: text("job")?,
            marital: text("marital")?,
            education: text("education")?,
            default: text("default")?,
            housing: text("housing")?,
            loan: text("loan")?,
            contact: text("contact")?,
            month: text("month")?,
            day_of_week: text("day_of_week")?,
            duration: int("duration", None)?,
            campaign: int("campaign", None)?,
            pdays: int("pdays", Some(default_pdays()))?,
            previous: int("previous", Some(default_previous()))?,
            poutcome: text("poutcome")?,
            emp_var_rate: num("emp_var_rate")?,
            cons_price_idx: num("cons_price_idx")?,
            cons_conf_idx: num("cons_conf_idx")?,
            euribor3m: num("euribor3m")?,
            nr_employed: num("nr_employed")?,
        })
    }

    /// Value of the named field.
    pub fn value(&self, name: &str) -> Option<FieldValue<'_>> {
        use FieldValue::*;
        let v = match field(name)?.name {
            "age" => Integer(self.age),
            "job" => Text(&self.job),
            "marital" => Text(&self.marital),
            "education" => Text(&self.education),
            "default" => Text(&self.default),
            "housing" => Text(&self.housing),
            "loan" => Text(&self.loan),
            "contact" => Text(&self.contact),
            "month" => Text(&self.month),
            "day_of_week" => Text(&self.day_of_week),
            "duration" => Integer(self.duration),
            "campaign" => Integer(self.campaign),
            "pdays" => Integer(self.pdays),
            "previous" => Integer(self.previous),
            "poutcome" => Text(&self.poutcome),
            "emp_var_rate" => Real(self.emp_var_rate),
            "cons_price_idx" => Real(self.cons_price_idx),
            "cons_conf_idx" => Real(self.cons_conf_idx),
            "euribor3m" => Real(self.euribor3m),
            "nr_employed" => Real(self.nr_employed),
            _ => return None,
        };
        Some(v)
    }

    /// Field values rendered as text, in canonical order.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        FIELDS
            .iter()
            .filter_map(|spec| self.value(spec.name).map(|v| (spec.name, v.to_string())))
            .collect()
    }

    /// Checks every field against its domain and encodes the record.
    pub fn encode(&self) -> Result<EncodedRecord, SchemaError> {
        let mut values = [0.0f32; FIELD_COUNT];
        for (slot, spec) in values.iter_mut().zip(FIELDS.iter()) {
            let value = self
                .value(spec.name)
                .ok_or_else(|| SchemaError::MissingField(spec.name.to_string()))?;
            *slot = encode_value(spec, value)?;
        }
        Ok(EncodedRecord { values })
    }
}

fn check_range(spec: &FieldSpec, value: f64, min: f64, max: f64) -> Result<f32, SchemaError> {
    if !value.is_finite() || value < min || value > max {
        return Err(SchemaError::OutOfRange {
            field: spec.name.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(value as f32)
}

fn encode_value(spec: &FieldSpec, value: FieldValue<'_>) -> Result<f32, SchemaError> {
    match (spec.kind, value) {
        (FieldKind::Integer { min, max, .. }, FieldValue::Integer(v)) => {
            check_range(spec, v as f64, min as f64, max as f64)
        }
        (FieldKind::Real { min, max, .. }, FieldValue::Real(v)) => check_range(spec, v, min, max),
        (FieldKind::Categorical { .. }, FieldValue::Text(v)) => spec
            .code_of(v)
            .map(|code| code as f32)
            .ok_or_else(|| SchemaError::UnknownCategory {
                field: spec.name.to_string(),
                value: v.to_string(),
            }),
        (_, other) => Err(SchemaError::NotANumber {
            field: spec.name.to_string(),
            value: other.to_string(),
        }),
    }
}

/// A record after encoding: one `f32` per field, in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    values: [f32; FIELD_COUNT],
}

impl EncodedRecord {
    pub fn get(&self, name: &str) -> Option<f32> {
        position(name).map(|i| self.values[i])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}
