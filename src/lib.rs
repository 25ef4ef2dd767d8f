//! Salary Estimator - categorical job attributes in, predicted salary out
//!
//! The library holds the contract between user-facing category labels and the
//! numeric feature vector a pre-trained regressor expects, the prediction and
//! currency conversion steps around it, and the HTTP surface that drives them.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{build, convert, label_to_code, labels, FeatureVector, Predictor, Regressor, Schema, Selections};
pub use models::{PredictionResult, PredictRequest, SalaryRecord};
