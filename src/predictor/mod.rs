//! Prediction adapter.
//!
//! The premium model is an opaque collaborator behind `PremiumModel`:
//! it receives exactly `{bmi, age_group, city_tier}` and returns one
//! category label. The concrete model is loaded once at startup and shared
//! read-only for the life of the process.

pub mod tree;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::models::{AgeGroup, PredictionInput};

pub use tree::DecisionTreeModel;

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("Cannot read model artifact {path}: {source}")]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse model artifact {path}: {source}")]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("Model rejected feature row: {0}")]
    Rejected(String),
}

/// Single feature row handed to the model. `lifestyle_risk` is deliberately
/// absent: the model was trained without it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub bmi: f64,
    pub age_group: AgeGroup,
    pub city_tier: u8,
}

impl From<&PredictionInput> for FeatureRow {
    fn from(input: &PredictionInput) -> Self {
        FeatureRow {
            bmi: input.bmi(),
            age_group: input.age_group(),
            city_tier: input.city_tier(),
        }
    }
}

/// A trained classifier mapping one feature row to one category label.
pub trait PremiumModel: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn predict(&self, row: &FeatureRow) -> Result<String, PredictError>;
}

/// Load the model artifact at `path`. Called once at process start.
pub fn load_model(path: &Path) -> Result<Arc<dyn PremiumModel>, PredictError> {
    let model = DecisionTreeModel::from_file(path)?;
    tracing::info!(
        path = %path.display(),
        name = model.name(),
        version = model.version(),
        "Premium model loaded"
    );
    Ok(Arc::new(model))
}
