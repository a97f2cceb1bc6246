//! Bank Subscription Predictor Library
//!
//! Serves a single-page form that collects bank-marketing attributes of a
//! prospective customer, runs them through a pre-trained XGBoost classifier and
//! shows whether the customer is likely to subscribe.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `dataset`: Reference dataset preview and form choice lists.
//! - `errors`: Error handling types.
//! - `form`: HTML pages.
//! - `handlers`: HTTP request handlers and the router.
//! - `model`: Classifier artifact loading and tree-ensemble evaluation.
//! - `predictor`: Record-to-prediction pipeline.
//! - `presenter`: Prediction results and CSV export.
//! - `schema`: Canonical customer schema and categorical encoding.

pub mod config;
pub mod dataset;
pub mod errors;
pub mod form;
pub mod handlers;
pub mod model;
pub mod predictor;
pub mod presenter;
pub mod schema;
