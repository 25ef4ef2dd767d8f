use crate::core::features::FeatureVector;
use serde::{Deserialize, Serialize};

/// Outcome of one successful inference call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub amount_usd: f64,
    /// Input that produced this prediction
    pub features: FeatureVector,
    pub predicted_at: chrono::DateTime<chrono::Utc>,
}

/// One row of the salary dataset; other columns in the file are ignored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRecord {
    pub job_title: String,
    pub company_location: String,
    pub company_size: String,
    pub experience_level: String,
    pub salary_in_usd: f64,
}

/// A single bar or point of a chart series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: Option<f64>,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value: Some(value),
        }
    }

    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: None,
        }
    }
}
