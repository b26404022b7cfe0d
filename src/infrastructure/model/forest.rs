//! Decision-forest model stored as JSON.
//!
//! ```json
//! {
//!   "features": ["url_length", "has_https"],
//!   "trees": [
//!     {"nodes": [
//!       {"feature": "has_https", "threshold": 0.5, "left": 1, "right": 2},
//!       {"safe_probability": 0.2},
//!       {"safe_probability": 0.9}
//!     ]}
//!   ]
//! }
//! ```
//!
//! Node 0 is the root of each tree. A split sends the URL left when the
//! feature value is `<= threshold`. The prediction is the mean leaf
//! probability over all trees.

use serde::Deserialize;
use std::path::Path;

use crate::domain::error::ModelError;
use crate::domain::models::FeatureVector;
use crate::domain::ports::ClassifierModel;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum Node {
    Split {
        feature: String,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        safe_probability: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ForestFile {
    features: Vec<String>,
    trees: Vec<Tree>,
}

/// Validated forest ready for scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestModel {
    features: Vec<String>,
    trees: Vec<Tree>,
}

impl ForestModel {
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Load(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let file: ForestFile =
            serde_json::from_str(raw).map_err(|e| ModelError::Load(e.to_string()))?;

        if file.trees.is_empty() {
            return Err(ModelError::Load("forest has no trees".to_string()));
        }
        for (index, tree) in file.trees.iter().enumerate() {
            validate(index, tree, &file.features)?;
        }

        Ok(Self {
            features: file.features,
            trees: file.trees,
        })
    }

    /// Input schema in training order.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

/// Reject dangling child indices, unknown features, bad leaves and cycles.
fn validate(index: usize, tree: &Tree, schema: &[String]) -> Result<(), ModelError> {
    let malformed = |reason: String| ModelError::MalformedTree {
        tree: index,
        reason,
    };

    if tree.nodes.is_empty() {
        return Err(malformed("no nodes".to_string()));
    }

    for (at, node) in tree.nodes.iter().enumerate() {
        match node {
            Node::Split {
                feature,
                left,
                right,
                threshold,
            } => {
                if !schema.contains(feature) {
                    return Err(malformed(format!("node {at} splits on unknown feature '{feature}'")));
                }
                if !threshold.is_finite() {
                    return Err(malformed(format!("node {at} has a non-finite threshold")));
                }
                // Children must point forward, which also rules out cycles.
                for child in [*left, *right] {
                    if child <= at || child >= tree.nodes.len() {
                        return Err(malformed(format!("node {at} has invalid child {child}")));
                    }
                }
            }
            Node::Leaf { safe_probability } => {
                if !(0.0..=1.0).contains(safe_probability) {
                    return Err(malformed(format!(
                        "leaf {at} has probability {safe_probability}"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn evaluate(tree: &Tree, features: &FeatureVector) -> Result<f64, ModelError> {
    let mut at = 0;
    loop {
        match &tree.nodes[at] {
            Node::Leaf { safe_probability } => return Ok(*safe_probability),
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                let value = features
                    .get(feature)
                    .ok_or_else(|| ModelError::MissingFeature(feature.clone()))?;
                at = if value <= *threshold { *left } else { *right };
            }
        }
    }
}

impl ClassifierModel for ForestModel {
    fn predict_safe_probability(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        if let Some(missing) = self.features.iter().find(|name| features.get(name).is_none()) {
            return Err(ModelError::MissingFeature(missing.clone()));
        }

        let total = self
            .trees
            .iter()
            .map(|tree| evaluate(tree, features))
            .sum::<Result<f64, ModelError>>()?;
        Ok(total / self.trees.len() as f64)
    }
}
