//! Shared fixtures: a small hand-built XGBoost model over the canonical schema.
#![allow(dead_code)]

use bank_subscription_predictor::schema::{CustomerRecord, FIELDS};
use serde_json::{json, Value};
use std::io::Write;
use std::path::PathBuf;

fn tree(
    left: &[i32],
    right: &[i32],
    features: &[i32],
    conditions: &[f32],
    default_left: &[i32],
) -> Value {
    json!({
        "tree_param": {"num_nodes": left.len().to_string(), "num_feature": "20", "size_leaf_vector": "1"},
        "id": 0,
        "left_children": left,
        "right_children": right,
        "parents": vec![2147483647; left.len()],
        "split_indices": features,
        "split_conditions": conditions,
        "split_type": vec![0; left.len()],
        "default_left": default_left,
        "base_weights": conditions,
        "loss_changes": vec![0.0; left.len()],
        "sum_hessian": vec![1.0; left.len()],
        "categories": [],
        "categories_nodes": [],
        "categories_segments": [],
        "categories_sizes": []
    })
}

/// Three trees:
/// - duration < 300 → -1.2, else euribor3m < 1.5 → 1.5 / 0.4
/// - poutcome code < 1.5 → -0.3, else (success) → 1.0
/// - nr_employed < 5087 → 0.6, else → -0.4
pub fn model_json(with_names: bool) -> Value {
    let trees = vec![
        tree(
            &[1, -1, 3, -1, -1],
            &[2, -1, 4, -1, -1],
            &[10, 0, 18, 0, 0],
            &[300.0, -1.2, 1.5, 1.5, 0.4],
            &[1, 0, 1, 0, 0],
        ),
        tree(&[1, -1, -1], &[2, -1, -1], &[14, 0, 0], &[1.5, -0.3, 1.0], &[0, 0, 0]),
        tree(&[1, -1, -1], &[2, -1, -1], &[19, 0, 0], &[5087.0, 0.6, -0.4], &[1, 0, 0]),
    ];
    let names: Vec<&str> = if with_names {
        FIELDS.iter().map(|f| f.name).collect()
    } else {
        Vec::new()
    };
    json!({
        "version": [2, 1, 0],
        "learner": {
            "attributes": {},
            "feature_names": names,
            "feature_types": if with_names { vec!["float"; 20] } else { Vec::new() },
            "gradient_booster": {
                "name": "gbtree",
                "model": {
                    "gbtree_model_param": {"num_parallel_tree": "1", "num_trees": "3"},
                    "iteration_indptr": [0, 1, 2, 3],
                    "tree_info": [0, 0, 0],
                    "trees": trees
                }
            },
            "learner_model_param": {
                "base_score": "5E-1",
                "boost_from_average": "1",
                "num_class": "0",
                "num_feature": "20",
                "num_target": "1"
            },
            "objective": {"name": "binary:logistic", "reg_loss_param": {"scale_pos_weight": "1"}}
        }
    })
}

/// Writes `value` to a temporary `.json` file kept alive by the returned guard.
pub fn write_json(value: &Value) -> (tempfile::NamedTempFile, PathBuf) {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap();
    file.write_all(value.to_string().as_bytes()).unwrap();
    let path = file.path().to_path_buf();
    (file, path)
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// The example customer, without `pdays` / `previous`.
pub fn example_json() -> Value {
    json!({
        "age": 30, "job": "admin.", "marital": "single",
        "education": "university.degree", "default": "no", "housing": "yes",
        "loan": "no", "contact": "cellular", "month": "may", "day_of_week": "mon",
        "duration": 100, "campaign": 1, "poutcome": "nonexistent",
        "emp_var_rate": 1.1, "cons_price_idx": 93.2, "cons_conf_idx": -36.4,
        "euribor3m": 4.8, "nr_employed": 5191.0
    })
}

pub fn example_record() -> CustomerRecord {
    serde_json::from_value(example_json()).unwrap()
}

/// Customer the fixture model scores as a likely subscriber.
pub fn likely_subscriber() -> CustomerRecord {
    let mut record = example_record();
    record.duration = 1200;
    record.euribor3m = 1.0;
    record.poutcome = "success".into();
    record.nr_employed = 5000.0;
    record
}

pub const DATASET: &str = "age,job,marital,education,default,housing,loan,contact,month,day_of_week,duration,campaign,pdays,previous,poutcome,emp_var_rate,cons_price_idx,cons_conf_idx,euribor3m,nr_employed,y\n\
56,housemaid,married,basic.4y,no,no,no,telephone,may,mon,261,1,999,0,nonexistent,1.1,93.994,-36.4,4.857,5191.0,no\n\
57,services,married,high.school,unknown,no,no,telephone,may,mon,149,1,999,0,nonexistent,1.1,93.994,-36.4,4.857,5191.0,no\n\
37,services,married,high.school,no,yes,no,telephone,may,mon,226,1,999,0,nonexistent,1.1,93.994,-36.4,4.857,5191.0,no\n\
40,admin.,married,basic.6y,no,no,no,telephone,may,mon,151,1,999,0,nonexistent,1.1,93.994,-36.4,4.857,5191.0,no\n\
56,services,married,high.school,no,no,yes,telephone,may,mon,307,1,999,0,nonexistent,1.1,93.994,-36.4,4.857,5191.0,yes\n\
45,services,married,basic.9y,unknown,no,no,telephone,may,mon,198,1,999,0,nonexistent,1.1,93.994,-36.4,4.857,5191.0,no\n";
