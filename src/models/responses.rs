use crate::core::currency::RateSource;
use crate::models::domain::SeriesPoint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response for the predict endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub session_id: uuid::Uuid,
    pub amount_usd: f64,
    pub formatted: String,
    pub features: [u32; 5],
}

/// Last prediction of a session with an optional conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPredictionResponse {
    pub session_id: uuid::Uuid,
    pub amount_usd: f64,
    pub formatted: String,
    pub features: [u32; 5],
    pub predicted_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion: Option<ConversionResponse>,
}

/// Either a converted amount or the reason the conversion failed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Selection lists, keyed by schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub fields: BTreeMap<String, FieldOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOptions {
    pub display_name: String,
    pub position: usize,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrenciesResponse {
    pub options: Vec<String>,
    pub source: RateSource,
    /// True when only the fallback list is available
    pub limited: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResponse {
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub points: Vec<SeriesPoint>,
}

/// The four general charts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub salary_by_experience: SeriesResponse,
    pub salary_by_company_size: SeriesResponse,
    pub top_locations: SeriesResponse,
    pub top_job_titles: SeriesResponse,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            status_code,
            missing: Vec::new(),
        }
    }
}
