//! Flattened tree ensemble converted from an [`XgbModel`] and its evaluation.

use std::collections::HashMap;

use super::format::{GradientBooster, Tree, XgbModel};
use super::ModelError;

/// How the summed margin is turned into a positive-class probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// `binary:logistic`: base_score is a probability.
    Logistic,
    /// `binary:logitraw`: base_score is already a margin.
    LogitRaw,
}

impl Objective {
    fn parse(name: &str) -> Result<Self, ModelError> {
        match name {
            "binary:logistic" => Ok(Objective::Logistic),
            "binary:logitraw" => Ok(Objective::LogitRaw),
            other => Err(ModelError::UnsupportedObjective(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Objective::Logistic => "binary:logistic",
            Objective::LogitRaw => "binary:logitraw",
        }
    }

    /// XGBoost's `ProbToMargin`.
    fn base_margin(&self, base_score: f32) -> f32 {
        match self {
            Objective::Logistic => {
                let p = base_score.clamp(1e-7, 1.0 - 1e-7);
                (p / (1.0 - p)).ln()
            }
            Objective::LogitRaw => base_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf(f32),
    Split {
        feature: usize,
        threshold: f32,
        default_left: bool,
        left: usize,
        right: usize,
        /// Categories routed right, for categorical splits.
        categories: Option<Vec<i32>>,
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn leaf_value(&self, features: &[f32]) -> f32 {
        let mut idx = 0;
        // Children always sit after their parent, so the walk terminates.
        loop {
            match &self.nodes[idx] {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    default_left,
                    left,
                    right,
                    categories,
                } => {
                    let fvalue = features.get(*feature).copied().unwrap_or(f32::NAN);
                    let go_left = if fvalue.is_nan() {
                        *default_left
                    } else if let Some(cats) = categories {
                        // Invalid categories go left, the chosen set goes right.
                        !(fvalue >= 0.0
                            && fvalue.fract() == 0.0
                            && cats.contains(&(fvalue as i32)))
                    } else {
                        fvalue < *threshold
                    };
                    idx = if go_left { *left } else { *right };
                }
            }
        }
    }
}

fn convert_tree(
    tree: &Tree,
    tree_idx: usize,
    num_feature: usize,
) -> Result<DecisionTree, ModelError> {
    let num_nodes = tree.tree_param.num_nodes.max(0) as usize;
    if num_nodes == 0 {
        return Err(ModelError::EmptyTree(tree_idx));
    }
    let arrays = [
        tree.left_children.len(),
        tree.right_children.len(),
        tree.split_indices.len(),
        tree.split_conditions.len(),
        tree.default_left.len(),
    ];
    if arrays.iter().any(|&len| len < num_nodes) {
        return Err(ModelError::Malformed(format!(
            "tree {} declares {} nodes but its node arrays are shorter",
            tree_idx, num_nodes
        )));
    }

    let mut categorical: HashMap<usize, Vec<i32>> = HashMap::new();
    for (i, &node) in tree.categories_nodes.iter().enumerate() {
        let start = tree.categories_segments.get(i).copied().unwrap_or(0).max(0) as usize;
        let size = tree.categories_sizes.get(i).copied().unwrap_or(0).max(0) as usize;
        let cats = tree.categories.get(start..start + size).ok_or_else(|| {
            ModelError::Malformed(format!(
                "tree {} node {} has a category segment out of bounds",
                tree_idx, node
            ))
        })?;
        categorical.insert(node as usize, cats.to_vec());
    }

    let child = |node: usize, c: i32| -> Result<usize, ModelError> {
        if c <= 0 || c as usize <= node || c as usize >= num_nodes {
            return Err(ModelError::InvalidNodeIndex {
                tree: tree_idx,
                node,
                child: c,
                num_nodes,
            });
        }
        Ok(c as usize)
    };

    let mut nodes = Vec::with_capacity(num_nodes);
    for idx in 0..num_nodes {
        let left = tree.left_children[idx];
        if left == -1 {
            nodes.push(Node::Leaf(tree.split_conditions[idx]));
            continue;
        }
        let feature = tree.split_indices[idx];
        if feature < 0 || (num_feature > 0 && feature as usize >= num_feature) {
            return Err(ModelError::Malformed(format!(
                "tree {} node {} splits on feature {} but the model has {} features",
                tree_idx, idx, feature, num_feature
            )));
        }
        let is_categorical = tree.split_type.get(idx).copied().unwrap_or(0) == 1;
        nodes.push(Node::Split {
            feature: feature as usize,
            threshold: tree.split_conditions[idx],
            default_left: tree.default_left[idx],
            left: child(idx, left)?,
            right: child(idx, tree.right_children[idx])?,
            categories: if is_categorical {
                Some(categorical.remove(&idx).unwrap_or_default())
            } else {
                None
            },
        });
    }

    Ok(DecisionTree { nodes })
}

/// A binary-classification tree ensemble ready for inference.
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<DecisionTree>,
    tree_weights: Vec<f32>,
    base_margin: f32,
    objective: Objective,
    num_feature: usize,
    feature_names: Vec<String>,
    booster: &'static str,
}

impl Forest {
    /// Converts a parsed XGBoost document.
    ///
    /// Only single-output binary classifiers built from trees are accepted.
    pub fn from_xgboost(model: &XgbModel) -> Result<Self, ModelError> {
        let learner = &model.learner;
        let objective = Objective::parse(&learner.objective.name)?;
        if learner.learner_model_param.num_class > 1 {
            return Err(ModelError::UnsupportedObjective(format!(
                "{} with {} classes",
                learner.objective.name, learner.learner_model_param.num_class
            )));
        }

        let (model_trees, weight_drop) = match &learner.gradient_booster {
            GradientBooster::Gbtree { model } => (model, None),
            GradientBooster::Dart {
                gbtree,
                weight_drop,
            } => (&gbtree.model, Some(weight_drop)),
            GradientBooster::Gblinear { .. } => {
                return Err(ModelError::UnsupportedBooster("gblinear".to_string()))
            }
        };

        let num_feature = learner.learner_model_param.num_feature.max(0) as usize;
        if !learner.feature_names.is_empty() && learner.feature_names.len() != num_feature {
            return Err(ModelError::Malformed(format!(
                "model lists {} feature names but num_feature is {}",
                learner.feature_names.len(),
                num_feature
            )));
        }

        let trees = model_trees
            .trees
            .iter()
            .enumerate()
            .map(|(i, t)| convert_tree(t, i, num_feature))
            .collect::<Result<Vec<_>, _>>()?;

        let tree_weights = match weight_drop {
            Some(w) if w.len() == trees.len() => w.clone(),
            Some(w) => {
                return Err(ModelError::Malformed(format!(
                    "dart model has {} trees but {} drop weights",
                    trees.len(),
                    w.len()
                )))
            }
            None => vec![1.0; trees.len()],
        };

        Ok(Self {
            trees,
            tree_weights,
            base_margin: objective.base_margin(learner.learner_model_param.base_score),
            objective,
            num_feature,
            feature_names: learner.feature_names.clone(),
            booster: learner.gradient_booster.name(),
        })
    }

    /// Raw margin for one row of features in model column order.
    pub fn margin(&self, features: &[f32]) -> f32 {
        self.trees
            .iter()
            .zip(&self.tree_weights)
            .fold(self.base_margin, |acc, (tree, w)| {
                acc + w * tree.leaf_value(features)
            })
    }

    /// Positive-class probability in [0, 1].
    pub fn probability(&self, features: &[f32]) -> f32 {
        let margin = self.margin(features);
        1.0 / (1.0 + (-margin).exp())
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn num_feature(&self) -> usize {
        self.num_feature
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn booster(&self) -> &'static str {
        self.booster
    }
}
