// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{PredictionResult, SalaryRecord, SeriesPoint};
pub use requests::{PredictRequest, PredictionQuery};
pub use responses::{
    ConversionResponse, CurrenciesResponse, ErrorResponse, FieldOptions, HealthResponse, OptionsResponse,
    OverviewResponse, PredictResponse, SeriesResponse, SessionPredictionResponse,
};
