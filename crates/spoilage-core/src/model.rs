//! Trained model artifacts.
//!
//! The classifier treats a model as a black box behind the [`Model`] trait:
//! four features in, one output out. The output may be numeric or textual
//! depending on how the model was exported, see [`ModelOutput`].
//!
//! Artifacts are JSON documents tagged by `kind`:
//!
//! ```json
//! {
//!   "kind": "linear",
//!   "weights": [0.8, 0.05, 0.0, 0.004],
//!   "bias": -25.0,
//!   "labels": ["ok", "spoiled"]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Raw output of a model for a single feature vector.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// A class index or score.
    Number(f64),
    /// A class label.
    Text(String),
}

/// A trained model that can score one feature vector.
///
/// Implementations must be immutable after loading; the same instance is
/// shared by every request.
pub trait Model: Send + Sync {
    /// Predict the class of `[temperature, humidity, light, gas_level]`.
    fn predict(&self, features: &[f64; 4]) -> Result<ModelOutput>;
}

/// All artifact kinds understood by [`load_model`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearModel),
}

impl Model for ModelArtifact {
    fn predict(&self, features: &[f64; 4]) -> Result<ModelOutput> {
        match self {
            ModelArtifact::Linear(m) => m.predict(features),
        }
    }
}

/// Linear decision function: class 1 when `w·x + b > 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub weights: [f64; 4],
    pub bias: f64,
    /// Labels for class 0 and class 1. Without labels the class index is
    /// returned as a number.
    #[serde(default)]
    pub labels: Option<[String; 2]>,
}

impl LinearModel {
    fn score(&self, features: &[f64; 4]) -> f64 {
        self.weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias
    }
}

impl Model for LinearModel {
    fn predict(&self, features: &[f64; 4]) -> Result<ModelOutput> {
        let score = self.score(features);
        if !score.is_finite() {
            return Err(Error::Inference(format!("non-finite score {score}")));
        }

        let class = usize::from(score > 0.0);
        Ok(match &self.labels {
            Some(labels) => ModelOutput::Text(labels[class].clone()),
            None => ModelOutput::Number(class as f64),
        })
    }
}

/// Load a model artifact from a JSON file.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<ModelArtifact> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::ModelRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| Error::ModelFormat {
        path: path.to_path_buf(),
        source: e,
    })
}
