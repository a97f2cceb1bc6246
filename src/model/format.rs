//! Serde mirror of the XGBoost JSON model format (`Booster.save_model("*.json")`).
//!
//! Only the parts needed to evaluate a tree ensemble are kept; unknown keys are
//! ignored so models from newer XGBoost releases still load.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// base_score can be a number, a stringified number, an array or a bracketed
/// string like `"[5E-1]"` depending on the XGBoost version that wrote it.
fn deserialize_base_score<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    let mut cur = Value::deserialize(deserializer)?;
    loop {
        match cur {
            Value::Number(n) => {
                return n
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| SerdeError::custom("invalid number"));
            }
            Value::String(s) => {
                let t = s.trim();
                if let Ok(f) = t.parse::<f32>() {
                    return Ok(f);
                }
                if t.starts_with('[') && t.ends_with(']') {
                    if let Ok(f) = t[1..t.len() - 1].trim().parse::<f32>() {
                        return Ok(f);
                    }
                }
                return Err(SerdeError::custom(format!(
                    "cannot parse base_score from string: {}",
                    s
                )));
            }
            Value::Array(arr) => {
                cur = arr
                    .into_iter()
                    .next()
                    .ok_or_else(|| SerdeError::custom("empty base_score array"))?;
            }
            _ => {
                return Err(SerdeError::custom(
                    "base_score must be number, string, or array",
                ))
            }
        }
    }
}

/// Integers that XGBoost serializes as strings (`"num_feature": "20"`).
fn deserialize_int_any<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| SerdeError::custom("invalid integer")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| SerdeError::custom(format!("cannot parse integer from string: {}", s))),
        _ => Err(SerdeError::custom("integer must be number or string")),
    }
}

/// `default_left` is an int array in JSON models and a bool array in some exports.
fn deserialize_flags<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    let flags = Vec::<Flag>::deserialize(deserializer)?;
    Ok(flags
        .into_iter()
        .map(|f| match f {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        })
        .collect())
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeParam {
    #[serde(deserialize_with = "deserialize_int_any")]
    pub num_nodes: i64,
    #[serde(default, deserialize_with = "deserialize_int_any")]
    pub num_feature: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub tree_param: TreeParam,
    #[serde(default)]
    pub id: i32,
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub split_indices: Vec<i32>,
    /// Threshold for split nodes, leaf value for leaves.
    pub split_conditions: Vec<f32>,
    #[serde(deserialize_with = "deserialize_flags")]
    pub default_left: Vec<bool>,
    #[serde(default)]
    pub split_type: Vec<i32>,
    #[serde(default)]
    pub categories: Vec<i32>,
    #[serde(default)]
    pub categories_nodes: Vec<i32>,
    #[serde(default)]
    pub categories_segments: Vec<i64>,
    #[serde(default)]
    pub categories_sizes: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTrees {
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub tree_info: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GBTreeDefinition {
    pub model: ModelTrees,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum GradientBooster {
    Gbtree {
        model: ModelTrees,
    },
    Gblinear {
        #[serde(default)]
        model: Value,
    },
    Dart {
        gbtree: GBTreeDefinition,
        weight_drop: Vec<f32>,
    },
}

impl GradientBooster {
    pub fn name(&self) -> &'static str {
        match self {
            GradientBooster::Gbtree { .. } => "gbtree",
            GradientBooster::Gblinear { .. } => "gblinear",
            GradientBooster::Dart { .. } => "dart",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Objective {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LearnerModelParam {
    #[serde(deserialize_with = "deserialize_base_score")]
    pub base_score: f32,
    #[serde(default, deserialize_with = "deserialize_int_any")]
    pub num_class: i64,
    #[serde(deserialize_with = "deserialize_int_any")]
    pub num_feature: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Learner {
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub feature_types: Vec<String>,
    pub gradient_booster: GradientBooster,
    pub objective: Objective,
    pub learner_model_param: LearnerModelParam,
}

/// Top-level XGBoost JSON document.
#[derive(Debug, Clone, Deserialize)]
pub struct XgbModel {
    #[serde(default)]
    pub version: Vec<u32>,
    pub learner: Learner,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_score_parses_number_string_array_and_bracketed() {
        for raw in [json!(0.5), json!("5E-1"), json!([0.5]), json!("[5E-1]")] {
            let v = json!({"base_score": raw, "num_class": "0", "num_feature": "20"});
            let p: LearnerModelParam = serde_json::from_value(v).unwrap();
            assert_eq!(p.base_score, 0.5);
            assert_eq!(p.num_feature, 20);
        }
    }

    #[test]
    fn base_score_rejects_garbage() {
        let v = json!({"base_score": "half", "num_feature": "1"});
        assert!(serde_json::from_value::<LearnerModelParam>(v).is_err());
    }

    #[test]
    fn default_left_accepts_ints_and_bools() {
        let tree = json!({
            "tree_param": {"num_nodes": "3", "num_feature": "1"},
            "left_children": [1, -1, -1],
            "right_children": [2, -1, -1],
            "split_indices": [0, 0, 0],
            "split_conditions": [0.5, -1.0, 1.0],
            "default_left": [1, 0, false]
        });
        let tree: Tree = serde_json::from_value(tree).unwrap();
        assert_eq!(tree.default_left, vec![true, false, false]);
        assert!(tree.split_type.is_empty());
    }

    #[test]
    fn booster_tag_selects_variant() {
        let b: GradientBooster = serde_json::from_value(json!({
            "name": "gblinear",
            "model": {"weights": [0.1]}
        }))
        .unwrap();
        assert_eq!(b.name(), "gblinear");
    }
}
