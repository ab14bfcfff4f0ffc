//! Decision-tree classifier deserialized from a JSON artifact.
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "name": "premium-category",
//!   "version": "2024.1",
//!   "classes": ["Low", "Medium", "High"],
//!   "root": {
//!     "kind": "threshold", "feature": "bmi", "threshold": 30.0,
//!     "at_or_below": { "kind": "leaf", "category": "Low" },
//!     "above": { "kind": "leaf", "category": "High" }
//!   }
//! }
//! ```
//!
//! `membership` nodes route on `age_group`. Every leaf label must be one of
//! `classes`; this is checked once at load so `predict` cannot fail on a
//! well-formed row.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use super::{FeatureRow, PredictError, PremiumModel};
use crate::models::AgeGroup;

/// Deeper trees are rejected at load.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericFeature {
    Bmi,
    CityTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalFeature {
    AgeGroup,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        category: String,
    },
    Threshold {
        feature: NumericFeature,
        threshold: f64,
        at_or_below: Box<TreeNode>,
        above: Box<TreeNode>,
    },
    Membership {
        feature: CategoricalFeature,
        values: Vec<String>,
        matched: Box<TreeNode>,
        otherwise: Box<TreeNode>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTreeModel {
    name: String,
    version: String,
    classes: Vec<String>,
    root: TreeNode,
}

impl DecisionTreeModel {
    pub fn from_file(path: &Path) -> Result<Self, PredictError> {
        let content = std::fs::read_to_string(path).map_err(|source| PredictError::ArtifactIo {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self =
            serde_json::from_str(&content).map_err(|source| PredictError::ArtifactParse {
                path: path.to_path_buf(),
                source,
            })?;
        model.validate()?;
        Ok(model)
    }

    /// Parse and validate an artifact held in memory.
    pub fn from_json(json: &str) -> Result<Self, PredictError> {
        let model: Self = serde_json::from_str(json).map_err(|source| PredictError::ArtifactParse {
            path: "<memory>".into(),
            source,
        })?;
        model.validate()?;
        Ok(model)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    fn validate(&self) -> Result<(), PredictError> {
        if self.classes.is_empty() {
            return Err(PredictError::InvalidArtifact("no classes declared".into()));
        }

        let mut stack = vec![(&self.root, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            if depth > MAX_DEPTH {
                return Err(PredictError::InvalidArtifact(format!(
                    "tree deeper than {MAX_DEPTH} levels"
                )));
            }
            match node {
                TreeNode::Leaf { category } => {
                    if !self.classes.contains(category) {
                        return Err(PredictError::InvalidArtifact(format!(
                            "leaf category '{category}' is not a declared class"
                        )));
                    }
                }
                TreeNode::Threshold {
                    threshold,
                    at_or_below,
                    above,
                    ..
                } => {
                    if !threshold.is_finite() {
                        return Err(PredictError::InvalidArtifact("non-finite threshold".into()));
                    }
                    stack.push((&**at_or_below, depth + 1));
                    stack.push((&**above, depth + 1));
                }
                TreeNode::Membership {
                    values,
                    matched,
                    otherwise,
                    ..
                } => {
                    if let Some(bad) = values.iter().find(|v| AgeGroup::from_str(v).is_err()) {
                        return Err(PredictError::InvalidArtifact(format!(
                            "unknown age_group '{bad}' in membership node"
                        )));
                    }
                    stack.push((&**matched, depth + 1));
                    stack.push((&**otherwise, depth + 1));
                }
            }
        }
        Ok(())
    }
}

impl PremiumModel for DecisionTreeModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn predict(&self, row: &FeatureRow) -> Result<String, PredictError> {
        if !row.bmi.is_finite() {
            return Err(PredictError::Rejected(format!("bmi is not finite: {}", row.bmi)));
        }

        let mut node = &self.root;
        loop {
            node = match node {
                TreeNode::Leaf { category } => return Ok(category.clone()),
                TreeNode::Threshold {
                    feature,
                    threshold,
                    at_or_below,
                    above,
                } => {
                    let value = match feature {
                        NumericFeature::Bmi => row.bmi,
                        NumericFeature::CityTier => f64::from(row.city_tier),
                    };
                    if value <= *threshold {
                        &**at_or_below
                    } else {
                        &**above
                    }
                }
                TreeNode::Membership {
                    feature: CategoricalFeature::AgeGroup,
                    values,
                    matched,
                    otherwise,
                } => {
                    if values.iter().any(|v| v == row.age_group.as_str()) {
                        &**matched
                    } else {
                        &**otherwise
                    }
                }
            };
        }
    }
}
