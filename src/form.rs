//! HTML pages: the prediction form, its result banner and the dataset preview.

use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::collections::HashMap;

use crate::dataset::{ChoiceLists, ColumnSummary, ReferenceDataset};
use crate::presenter::PredictionResult;
use crate::schema::{FieldKind, FieldSpec, FIELDS};

const PAGE_TITLE: &str = "Prediksi Ketertarikan Nasabah Bank";

const STYLE: &str = r#"
body { background-color: #f0f2f6; font-family: 'Segoe UI', sans-serif; margin: 0; }
main { max-width: 760px; margin: 0 auto; padding: 2rem 1rem; }
h1, h2, h3 { color: #002060; }
nav a { margin-right: 1rem; color: #002060; }
.columns { display: flex; gap: 2rem; }
.columns > div { flex: 1; }
label { display: block; margin-top: .8rem; font-size: .9rem; }
input, select { width: 100%; padding: .35rem; box-sizing: border-box; }
button { margin-top: 1.2rem; padding: .5rem 1.2rem; }
.success { background: #dff5e1; border-left: 4px solid #1e8e3e; padding: .8rem; margin: 1rem 0; }
.error { background: #fde2e1; border-left: 4px solid #c5221f; padding: .8rem; margin: 1rem 0; }
table { border-collapse: collapse; font-size: .8rem; overflow-x: auto; display: block; }
td, th { border: 1px solid #ccc; padding: .25rem .4rem; white-space: nowrap; }
"#;

/// What to show under the form after a submission.
#[derive(Debug, Clone)]
pub enum Outcome {
    Success(PredictionResult),
    Failure(String),
}

/// Values currently shown in the form widgets, keyed by field name.
pub type FormValues = HashMap<String, String>;

/// Widget values before the user has touched anything.
pub fn default_values() -> FormValues {
    crate::schema::CustomerRecord::default()
        .to_pairs()
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn layout(title: &str, dataset_enabled: bool, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="id" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                main {
                    nav {
                        a href="/" { "Prediksi" }
                        @if dataset_enabled {
                            a href="/dataset" { "Dataset" }
                        }
                    }
                    (body)
                }
            }
        }
    }
}

fn widget(spec: &FieldSpec, choices: &ChoiceLists, values: &FormValues) -> Markup {
    let current = values.get(spec.name).map(String::as_str);
    match spec.kind {
        FieldKind::Integer { min, max, default } => html! {
            label for=(spec.name) { (spec.label) }
            input type="number" id=(spec.name) name=(spec.name) min=(min) max=(max) step="1"
                value=(current.map(str::to_string).unwrap_or_else(|| default.to_string())) required;
        },
        FieldKind::Real { min, max, default, step } => html! {
            label for=(spec.name) { (spec.label) }
            input type="number" id=(spec.name) name=(spec.name) min=(min) max=(max) step=(step)
                value=(current.map(str::to_string).unwrap_or_else(|| default.to_string())) required;
        },
        FieldKind::Categorical { default, .. } => {
            let selected = current.unwrap_or(default);
            html! {
                label for=(spec.name) { (spec.label) }
                select id=(spec.name) name=(spec.name) {
                    @for option in choices.get(spec.name) {
                        option value=(option) selected[option == selected] { (option) }
                    }
                }
            }
        }
    }
}

fn outcome_banner(outcome: &Outcome, values: &FormValues) -> Markup {
    match outcome {
        Outcome::Success(result) => html! {
            div.success { (result.summary()) }
            form method="post" action="/export" {
                @for spec in FIELDS.iter() {
                    @if let Some(value) = values.get(spec.name) {
                        input type="hidden" name=(spec.name) value=(value);
                    }
                }
                button type="submit" { "Unduh hasil (CSV)" }
            }
        },
        Outcome::Failure(message) => html! {
            div.error { (message) }
        },
    }
}

/// The prediction form, optionally followed by the outcome of a submission.
pub fn form_page(
    choices: &ChoiceLists,
    values: &FormValues,
    outcome: Option<&Outcome>,
    dataset_enabled: bool,
) -> Markup {
    let (left, right) = FIELDS.split_at(7);
    let body = html! {
        h1 { "Prediksi Ketertarikan Nasabah terhadap Produk Bank" }
        p { "Silakan isi data calon nasabah di bawah ini untuk melihat kemungkinan ketertarikan mereka terhadap produk bank." }
        form method="post" action="/predict" {
            div.columns {
                div { @for spec in left { (widget(spec, choices, values)) } }
                div { @for spec in right { (widget(spec, choices, values)) } }
            }
            button type="submit" { "Prediksi" }
        }
        @if let Some(outcome) = outcome {
            (outcome_banner(outcome, values))
        }
    };
    layout(PAGE_TITLE, dataset_enabled, body)
}

fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.4}", value)
    }
}

/// Read-only preview of the reference dataset.
pub fn dataset_page(dataset: &ReferenceDataset, rows: usize, stats: &[ColumnSummary]) -> Markup {
    let body = html! {
        h1 { "Dataset Referensi" }
        p { (dataset.len()) " baris, " (dataset.headers().len()) " kolom." }
        h2 { "Data teratas" }
        table {
            thead { tr { @for h in dataset.headers() { th { (h) } } } }
            tbody {
                @for row in dataset.head(rows) {
                    tr { @for cell in row { td { (cell) } } }
                }
            }
        }
        h2 { "Statistik deskriptif" }
        table {
            thead {
                tr {
                    th { "" }
                    @for s in stats { th { (s.column) } }
                }
            }
            tbody {
                tr { th { "count" } @for s in stats { td { (s.count) } } }
                tr { th { "mean" } @for s in stats { td { (format_stat(s.mean)) } } }
                tr { th { "std" } @for s in stats { td { (format_stat(s.std)) } } }
                tr { th { "min" } @for s in stats { td { (format_stat(s.min)) } } }
                tr { th { "25%" } @for s in stats { td { (format_stat(s.q1)) } } }
                tr { th { "50%" } @for s in stats { td { (format_stat(s.median)) } } }
                tr { th { "75%" } @for s in stats { td { (format_stat(s.q3)) } } }
                tr { th { "max" } @for s in stats { td { (format_stat(s.max)) } } }
            }
        }
    };
    layout("Dataset Referensi", true, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::Label;

    #[test]
    fn form_has_one_widget_per_field() {
        let html = form_page(&ChoiceLists::fixed(), &default_values(), None, false).into_string();
        for spec in FIELDS.iter() {
            assert!(html.contains(&format!("name=\"{}\"", spec.name)), "{}", spec.name);
        }
        assert!(html.contains("min=\"18\" max=\"100\""));
        assert!(html.contains("name=\"euribor3m\" min=\"0\" max=\"6\" step=\"0.01\" value=\"4.8\""));
        assert!(!html.contains("/dataset"));
        assert!(!html.contains("/export"));
    }

    #[test]
    fn submitted_values_are_selected() {
        let mut values = default_values();
        values.insert("job".into(), "student".into());
        let html = form_page(&ChoiceLists::fixed(), &values, None, true).into_string();
        assert!(html.contains("<option value=\"student\" selected>student</option>"));
        assert!(html.contains("href=\"/dataset\""));
    }

    #[test]
    fn success_offers_export() {
        let outcome = Outcome::Success(PredictionResult {
            label: Label::Ya,
            probability: 61.0,
        });
        let html =
            form_page(&ChoiceLists::fixed(), &default_values(), Some(&outcome), false).into_string();
        assert!(html.contains("Prediksi: Ya (61.00%)"));
        assert!(html.contains("action=\"/export\""));
        assert!(html.contains("type=\"hidden\" name=\"nr_employed\" value=\"5191\""));
    }

    #[test]
    fn failure_text_is_escaped() {
        let outcome = Outcome::Failure("Gagal memproses prediksi: <script>".into());
        let html =
            form_page(&ChoiceLists::fixed(), &default_values(), Some(&outcome), false).into_string();
        assert!(html.contains("Gagal memproses prediksi: &lt;script&gt;"));
    }
}
