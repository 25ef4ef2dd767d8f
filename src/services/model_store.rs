use crate::core::encoding::Schema;
use crate::core::predictor::{ModelError, Regressor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Errors that make the model artifact unusable; all are fatal at startup
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Model file '{0}' not found")]
    NotFound(PathBuf),

    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}

/// JSON export of a trained regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub n_features: usize,
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub model: ModelSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    TreeEnsemble {
        #[serde(default)]
        aggregation: Aggregation,
        #[serde(default)]
        base_score: f64,
        trees: Vec<Tree>,
    },
}

/// How tree outputs combine: averaged (random forest) or summed (boosting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Mean,
    Sum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl Tree {
    /// Walk from the root; `row[feature] <= threshold` goes left
    fn evaluate(&self, row: &[f64]) -> Result<f64, ModelError> {
        let mut index = 0;
        // A validated tree reaches a leaf in at most `nodes.len()` steps
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(Node::Leaf { value }) => return Ok(*value),
                Some(Node::Split { feature, threshold, left, right }) => {
                    let x = row.get(*feature).ok_or_else(|| {
                        ModelError::Evaluation(format!("split on missing feature {}", feature))
                    })?;
                    index = if *x <= *threshold { *left } else { *right };
                }
                None => return Err(ModelError::Evaluation(format!("dangling node index {}", index))),
            }
        }
        Err(ModelError::Evaluation("tree does not terminate".to_string()))
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split { feature, left, right, .. } = node {
                if *feature >= n_features {
                    return Err(format!("node {} splits on feature {} of {}", i, feature, n_features));
                }
                // Children always point forward, which rules out cycles
                if *left <= i || *right <= i || *left >= self.nodes.len() || *right >= self.nodes.len() {
                    return Err(format!("node {} has invalid children", i));
                }
            }
        }
        Ok(())
    }
}

impl ModelArtifact {
    /// Read and validate an artifact from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<LoadedModel, ModelLoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelLoadError::NotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path)?;
        let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
        let model = artifact.validate()?;

        tracing::info!("Loaded {} model from {}", model.name(), path.display());
        Ok(model)
    }

    /// Check the artifact against the encoding contract
    pub fn validate(self) -> Result<LoadedModel, ModelLoadError> {
        if self.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ModelLoadError::Invalid(format!("unsupported format version {}", self.format_version)));
        }
        if self.n_features != Schema::ALL.len() {
            return Err(ModelLoadError::Invalid(format!(
                "model expects {} features, encoding produces {}",
                self.n_features,
                Schema::ALL.len()
            )));
        }
        if !self.feature_names.is_empty() {
            let expected: Vec<&str> = Schema::ALL.iter().map(|s| s.field_name()).collect();
            if self.feature_names != expected {
                return Err(ModelLoadError::Invalid(format!(
                    "feature order {:?} does not match {:?}",
                    self.feature_names, expected
                )));
            }
        }

        match &self.model {
            ModelSpec::Linear { coefficients, .. } => {
                if coefficients.len() != self.n_features {
                    return Err(ModelLoadError::Invalid(format!(
                        "{} coefficients for {} features",
                        coefficients.len(),
                        self.n_features
                    )));
                }
            }
            ModelSpec::TreeEnsemble { trees, .. } => {
                if trees.is_empty() {
                    return Err(ModelLoadError::Invalid("tree ensemble has no trees".to_string()));
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(self.n_features)
                        .map_err(|e| ModelLoadError::Invalid(format!("tree {}: {}", i, e)))?;
                }
            }
        }

        Ok(LoadedModel {
            n_features: self.n_features,
            spec: self.model,
        })
    }
}

/// A validated model ready to score rows
#[derive(Debug, Clone)]
pub struct LoadedModel {
    n_features: usize,
    spec: ModelSpec,
}

impl LoadedModel {
    fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }

        match &self.spec {
            ModelSpec::Linear { intercept, coefficients } => {
                Ok(intercept + coefficients.iter().zip(row).map(|(c, x)| c * x).sum::<f64>())
            }
            ModelSpec::TreeEnsemble { aggregation, base_score, trees } => {
                let mut total = 0.0;
                for tree in trees {
                    total += tree.evaluate(row)?;
                }
                let combined = match aggregation {
                    Aggregation::Mean => total / trees.len() as f64,
                    Aggregation::Sum => total,
                };
                Ok(base_score + combined)
            }
        }
    }
}

impl Regressor for LoadedModel {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    fn name(&self) -> &str {
        match self.spec {
            ModelSpec::Linear { .. } => "linear",
            ModelSpec::TreeEnsemble { aggregation: Aggregation::Mean, .. } => "random_forest",
            ModelSpec::TreeEnsemble { aggregation: Aggregation::Sum, .. } => "gradient_boosting",
        }
    }
}
