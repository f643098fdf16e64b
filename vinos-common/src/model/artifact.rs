//! Serialized tree-model artifacts
//!
//! Two JSON layouts, tagged by `kind`:
//!
//! ```json
//! {"kind": "decision_tree", "feature_names": [...], "classes": [0, 1, 2, 3, 4, 5],
//!  "nodes": [{"feature": 10, "threshold": 10.25, "left": 1, "right": 2},
//!            {"value": [0.0, 1.0, 8.0, 3.0, 0.0, 0.0]}, ...]}
//!
//! {"kind": "gradient_boosted", "feature_names": [...], "classes": [...],
//!  "base_score": 0.5,
//!  "trees": [{"class": 0, "nodes": [{"feature": 4, "threshold": 0.2, "left": 1, "right": 2},
//!                                   {"value": -0.4}, {"value": 0.6}]}, ...]}
//! ```
//!
//! Decision-tree splits go left on `x <= threshold`, boosted splits on
//! `x < threshold`. Children always sit after their parent in the node
//! array, which is what bounds every walk.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::Classifier;
use crate::features::{FeatureVector, FEATURE_COUNT};
use crate::quality::PredictedClass;
use crate::{Error, Result};

/// One node of a serialized tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node<L> {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: L,
    },
}

/// Single classification tree with per-class leaf weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    feature_names: Vec<String>,
    classes: Vec<i64>,
    nodes: Vec<Node<Vec<f64>>>,
}

/// One regression tree of a boosted ensemble, scoring a single class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedTree {
    class: usize,
    nodes: Vec<Node<f64>>,
}

/// Softmax-style boosted ensemble: one score per class, highest wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosted {
    feature_names: Vec<String>,
    classes: Vec<i64>,
    #[serde(default)]
    base_score: f64,
    trees: Vec<BoostedTree>,
}

/// Any supported artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeModel {
    DecisionTree(DecisionTree),
    GradientBoosted(GradientBoosted),
}

impl TreeModel {
    /// Parse and structurally check an artifact
    ///
    /// Errors are plain descriptions; the loader decides how to report them.
    pub fn from_json(text: &str) -> std::result::Result<Self, String> {
        let model: TreeModel = serde_json::from_str(text).map_err(|e| e.to_string())?;
        model.check()?;
        Ok(model)
    }

    pub fn from_path(path: &Path) -> std::result::Result<Self, String> {
        let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        Self::from_json(&text)
    }

    fn check(&self) -> std::result::Result<(), String> {
        match self {
            TreeModel::DecisionTree(tree) => {
                check_classes(&tree.classes)?;
                check_nodes(&tree.nodes, |value: &Vec<f64>| {
                    if value.len() != tree.classes.len() {
                        return Err(format!(
                            "leaf has {} weights for {} classes",
                            value.len(),
                            tree.classes.len()
                        ));
                    }
                    if value.iter().any(|v| !v.is_finite()) {
                        return Err("leaf weight is not finite".to_string());
                    }
                    Ok(())
                })
            }
            TreeModel::GradientBoosted(ensemble) => {
                check_classes(&ensemble.classes)?;
                if !ensemble.base_score.is_finite() {
                    return Err("base_score is not finite".to_string());
                }
                if ensemble.trees.is_empty() {
                    return Err("ensemble has no trees".to_string());
                }
                for (i, tree) in ensemble.trees.iter().enumerate() {
                    if tree.class >= ensemble.classes.len() {
                        return Err(format!(
                            "tree {} scores class slot {} but there are {} classes",
                            i,
                            tree.class,
                            ensemble.classes.len()
                        ));
                    }
                    check_nodes(&tree.nodes, |value: &f64| {
                        if value.is_finite() {
                            Ok(())
                        } else {
                            Err("leaf value is not finite".to_string())
                        }
                    })
                    .map_err(|e| format!("tree {}: {}", i, e))?;
                }
                Ok(())
            }
        }
    }
}

fn check_classes(classes: &[i64]) -> std::result::Result<(), String> {
    if classes.is_empty() {
        return Err("no classes declared".to_string());
    }
    for (i, class) in classes.iter().enumerate() {
        if classes[..i].contains(class) {
            return Err(format!("class {} declared twice", class));
        }
    }
    Ok(())
}

fn check_nodes<L>(
    nodes: &[Node<L>],
    check_leaf: impl Fn(&L) -> std::result::Result<(), String>,
) -> std::result::Result<(), String> {
    if nodes.is_empty() {
        return Err("tree has no nodes".to_string());
    }
    for (i, node) in nodes.iter().enumerate() {
        match node {
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= FEATURE_COUNT {
                    return Err(format!("node {} splits on unknown feature {}", i, feature));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {} has a non-finite threshold", i));
                }
                for child in [*left, *right] {
                    if child <= i || child >= nodes.len() {
                        return Err(format!("node {} has invalid child {}", i, child));
                    }
                }
            }
            Node::Leaf { value } => check_leaf(value).map_err(|e| format!("node {}: {}", i, e))?,
        }
    }
    Ok(())
}

/// Follow splits from the root to a leaf
fn walk<'a, L>(
    nodes: &'a [Node<L>],
    features: &FeatureVector,
    go_left: fn(f64, f64) -> bool,
) -> Result<&'a L> {
    let mut index = 0;
    loop {
        match nodes.get(index) {
            Some(Node::Leaf { value }) => return Ok(value),
            Some(Node::Split {
                feature,
                threshold,
                left,
                right,
            }) => {
                let x = features
                    .values()
                    .get(*feature)
                    .copied()
                    .ok_or_else(|| Error::Inference(format!("unknown feature index {}", feature)))?;
                let next = if go_left(x, *threshold) { *left } else { *right };
                if next <= index {
                    return Err(Error::Inference(format!("node {} points backwards", index)));
                }
                index = next;
            }
            None => return Err(Error::Inference(format!("node {} does not exist", index))),
        }
    }
}

/// Index of the first maximum
fn argmax(scores: &[f64]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &s)| match best {
            Some((_, b)) if b >= s => best,
            _ => Some((i, s)),
        })
        .map(|(i, _)| i)
}

impl Classifier for TreeModel {
    fn feature_names(&self) -> &[String] {
        match self {
            TreeModel::DecisionTree(tree) => &tree.feature_names,
            TreeModel::GradientBoosted(ensemble) => &ensemble.feature_names,
        }
    }

    fn predict(&self, features: &FeatureVector) -> Result<PredictedClass> {
        let (classes, slot) = match self {
            TreeModel::DecisionTree(tree) => {
                let weights = walk(&tree.nodes, features, |x, t| x <= t)?;
                (&tree.classes, argmax(weights))
            }
            TreeModel::GradientBoosted(ensemble) => {
                let mut scores = vec![ensemble.base_score; ensemble.classes.len()];
                for tree in &ensemble.trees {
                    let leaf = walk(&tree.nodes, features, |x, t| x < t)?;
                    let score = scores.get_mut(tree.class).ok_or_else(|| {
                        Error::Inference(format!("tree scores unknown class slot {}", tree.class))
                    })?;
                    *score += *leaf;
                }
                (&ensemble.classes, argmax(&scores))
            }
        };

        slot.and_then(|i| classes.get(i))
            .map(|&class| PredictedClass(class))
            .ok_or_else(|| Error::Inference("artifact produced no class scores".to_string()))
    }
}
