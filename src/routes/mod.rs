// Route exports
pub mod analytics;
pub mod predict;

use crate::models::ErrorResponse;
use actix_web::{error, http::StatusCode, web, HttpResponse};

pub use predict::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(predict::configure)
            .configure(analytics::configure),
    );
}

/// Extractor configuration shared by the binary and the HTTP tests
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
        .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
        .app_data(web::PathConfig::default().error_handler(handle_path_error));
}

/// Extractor failure rendered as a JSON error body
#[derive(Debug)]
pub struct ApiError(pub ErrorResponse);

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.0.error, self.0.message)
    }
}

impl std::error::Error for ApiError {}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(&self.0)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError(ErrorResponse::new("invalid_json", format!("Invalid JSON: {}", err), 400)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    ApiError(ErrorResponse::new("invalid_query", format!("Invalid query: {}", err), 400)).into()
}

/// Handle path segment errors, e.g. a malformed session id
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    ApiError(ErrorResponse::new("invalid_path", format!("Invalid path: {}", err), 400)).into()
}
