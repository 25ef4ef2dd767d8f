use crate::core::features::FeatureVector;
use crate::models::PredictionResult;
use std::sync::Arc;
use thiserror::Error;

/// Failures raised by a model while scoring rows
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Shape mismatch: expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Model evaluation failed: {0}")]
    Evaluation(String),
}

/// Per-request prediction failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("Inference failed: {0}")]
    Inference(#[from] ModelError),

    #[error("Inference failed: model returned {0} outputs for a single row")]
    OutputShape(usize),

    #[error("Inference failed: model returned a non-finite value")]
    NonFinite,
}

/// A trained regressor treated as an opaque function
///
/// Takes a `[n, 5]` table of encoded rows and returns `n` predictions.
pub trait Regressor: Send + Sync {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError>;

    /// Human readable model kind, reported by the health endpoint
    fn name(&self) -> &str;
}

/// Wraps the loaded model and enforces the single-row shape contract
#[derive(Clone)]
pub struct Predictor {
    model: Arc<dyn Regressor>,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor").field("model", &self.model.name()).finish()
    }
}

impl Predictor {
    pub fn new(model: Arc<dyn Regressor>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Score one feature vector
    ///
    /// No caching: identical vectors are recomputed on every call.
    pub fn predict(&self, vector: FeatureVector) -> Result<PredictionResult, PredictionError> {
        let outputs = self.model.predict(&[vector.as_row()])?;

        let amount_usd = match outputs.as_slice() {
            [value] => *value,
            other => return Err(PredictionError::OutputShape(other.len())),
        };

        if !amount_usd.is_finite() {
            return Err(PredictionError::NonFinite);
        }

        tracing::debug!("Predicted {:.2} USD for features {:?}", amount_usd, vector.codes());

        Ok(PredictionResult {
            amount_usd,
            features: vector,
            predicted_at: chrono::Utc::now(),
        })
    }
}

/// One-shot startup state of the prediction invoker
#[derive(Debug, Clone, Default)]
pub enum ModelState {
    #[default]
    Uninitialized,
    Ready(Predictor),
    Failed(String),
}

impl ModelState {
    /// Run the loader once and settle into `Ready` or the terminal `Failed`
    pub fn initialize<E, F>(loader: F) -> Self
    where
        E: std::fmt::Display,
        F: FnOnce() -> Result<Arc<dyn Regressor>, E>,
    {
        match loader() {
            Ok(model) => ModelState::Ready(Predictor::new(model)),
            Err(e) => ModelState::Failed(e.to_string()),
        }
    }

    pub fn predictor(&self) -> Option<&Predictor> {
        match self {
            ModelState::Ready(predictor) => Some(predictor),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoding::Schema;
    use crate::core::features::{build, Selections};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SumModel {
        calls: AtomicUsize,
    }

    impl Regressor for SumModel {
        fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(rows.iter().map(|row| 1000.0 * row.iter().sum::<f64>()).collect())
        }

        fn name(&self) -> &str {
            "sum"
        }
    }

    struct FixedOutput(Vec<f64>);

    impl Regressor for FixedOutput {
        fn predict(&self, _rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn vector() -> FeatureVector {
        build(
            &Selections::new()
                .with(Schema::ExperienceLevel, "Entry-Level")
                .with(Schema::EmploymentType, "Full-Time")
                .with(Schema::JobTitle, "Data Scientist")
                .with(Schema::CompanyLocation, "US")
                .with(Schema::CompanySize, "Medium"),
        )
        .unwrap()
    }

    #[test]
    fn test_predict_single_row() {
        let model = Arc::new(SumModel { calls: AtomicUsize::new(0) });
        let predictor = Predictor::new(model.clone());

        let result = predictor.predict(vector()).unwrap();
        assert_eq!(result.amount_usd, 128_000.0);
        assert_eq!(result.features, vector());
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_predict_is_not_cached() {
        let model = Arc::new(SumModel { calls: AtomicUsize::new(0) });
        let predictor = Predictor::new(model.clone());

        let first = predictor.predict(vector()).unwrap();
        let second = predictor.predict(vector()).unwrap();
        assert_eq!(first.amount_usd, second.amount_usd);
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_predict_rejects_wrong_output_length() {
        let predictor = Predictor::new(Arc::new(FixedOutput(vec![1.0, 2.0])));
        assert_eq!(predictor.predict(vector()).unwrap_err(), PredictionError::OutputShape(2));

        let predictor = Predictor::new(Arc::new(FixedOutput(vec![])));
        assert_eq!(predictor.predict(vector()).unwrap_err(), PredictionError::OutputShape(0));
    }

    #[test]
    fn test_predict_rejects_nan() {
        let predictor = Predictor::new(Arc::new(FixedOutput(vec![f64::NAN])));
        assert_eq!(predictor.predict(vector()).unwrap_err(), PredictionError::NonFinite);
    }

    #[test]
    fn test_model_state_transitions() {
        let ready = ModelState::initialize(|| {
            Ok::<Arc<dyn Regressor>, String>(Arc::new(FixedOutput(vec![1.0])))
        });
        assert!(ready.predictor().is_some());

        let failed = ModelState::initialize(|| Err::<Arc<dyn Regressor>, _>("missing artifact"));
        assert!(failed.predictor().is_none());
        assert!(matches!(failed, ModelState::Failed(reason) if reason == "missing artifact"));

        assert!(ModelState::default().predictor().is_none());
    }
}
