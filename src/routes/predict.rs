use crate::core::currency::{convert, currency_options, format_amount};
use crate::core::encoding::{labels, Schema};
use crate::core::features::{build, FeatureError};
use crate::core::predictor::Predictor;
use crate::models::{
    ConversionResponse, CurrenciesResponse, ErrorResponse, FieldOptions, HealthResponse, OptionsResponse,
    PredictRequest, PredictResponse, PredictionQuery, SessionPredictionResponse,
};
use crate::services::{Dataset, RatesProvider, SessionStore};
use actix_web::{web, HttpResponse, Responder};
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
    pub rates: RatesProvider,
    pub sessions: SessionStore,
    pub dataset: Arc<Dataset>,
}

/// Configure prediction and currency routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/options", web::get().to(selection_options))
        .route("/predict", web::post().to(predict))
        .route("/currencies", web::get().to(currencies))
        .route("/sessions/{session_id}/prediction", web::get().to(session_prediction));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.predictor.model_name().to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Selection lists for every field, placeholder first
async fn selection_options() -> impl Responder {
    let fields = Schema::ALL
        .iter()
        .map(|schema| {
            let options = FieldOptions {
                display_name: schema.display_name().to_string(),
                position: schema.position(),
                options: labels(*schema).into_iter().map(str::to_string).collect(),
            };
            (schema.field_name().to_string(), options)
        })
        .collect::<BTreeMap<_, _>>();

    HttpResponse::Ok().json(OptionsResponse { fields })
}

/// Predict salary endpoint
///
/// POST /api/v1/predict
///
/// Request body:
/// ```json
/// {
///   "sessionId": "uuid",
///   "experienceLevel": "Entry-Level",
///   "employmentType": "Full-Time",
///   "jobTitle": "Data Scientist",
///   "companyLocation": "US",
///   "companySize": "Medium"
/// }
/// ```
async fn predict(state: web::Data<AppState>, req: web::Json<PredictRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for predict request: field_errors={:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::new("validation_failed", errors.to_string(), 400));
    }

    let (session_id, session) = state.sessions.get_or_create(req.session_id).await;

    // Every submit clears the previous result before anything else happens
    let ticket = session.lock().await.begin_cycle();

    let vector = match build(&req.selections()) {
        Ok(vector) => vector,
        Err(FeatureError::IncompleteSelection { missing }) => {
            session.lock().await.fail(ticket);
            tracing::debug!("Rejected incomplete selection for session {}: {:?}", session_id, missing);
            let mut body = ErrorResponse::new(
                "incomplete_selection",
                "Please make a selection for every field to get a prediction.",
                400,
            );
            body.missing = missing.iter().map(|s| s.field_name().to_string()).collect();
            return HttpResponse::BadRequest().json(body);
        }
        Err(FeatureError::Encoding(e)) => {
            session.lock().await.fail(ticket);
            tracing::warn!("Unknown label in predict request for session {}: {}", session_id, e);
            return HttpResponse::BadRequest().json(ErrorResponse::new("unknown_label", e.to_string(), 400));
        }
    };

    match state.predictor.predict(vector) {
        Ok(result) => {
            let response = PredictResponse {
                session_id,
                amount_usd: result.amount_usd,
                formatted: format!("${}", format_amount(result.amount_usd)),
                features: result.features.codes(),
            };

            if session.lock().await.complete(ticket, result) {
                tracing::info!(
                    "Predicted {} USD for session {}",
                    response.formatted,
                    session_id
                );
            }

            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            session.lock().await.fail(ticket);
            tracing::error!("Prediction failed for session {}: {}", session_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "inference_error",
                format!("An error occurred during prediction: {}", e),
                500,
            ))
        }
    }
}

/// Currency codes offered for conversion
async fn currencies(state: web::Data<AppState>) -> impl Responder {
    let table = state.rates.table().await;
    if table.is_fallback() {
        tracing::warn!("Could not fetch full currency list. Using a default list.");
    }

    HttpResponse::Ok().json(CurrenciesResponse {
        options: currency_options(&table),
        source: table.source,
        limited: table.is_fallback(),
    })
}

/// Last prediction of a session, optionally converted
///
/// GET /api/v1/sessions/{sessionId}/prediction?currency=EUR
///
/// A missing rate is reported inside `conversion`; the USD amount is still returned.
async fn session_prediction(
    state: web::Data<AppState>,
    path: web::Path<uuid::Uuid>,
    query: web::Query<PredictionQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("validation_failed", errors.to_string(), 400));
    }

    let session_id = path.into_inner();
    let Some(session) = state.sessions.get(&session_id).await else {
        return HttpResponse::NotFound().json(ErrorResponse::new(
            "session_not_found",
            format!("No session with id {}", session_id),
            404,
        ));
    };

    let Some(result) = session.lock().await.last().cloned() else {
        return HttpResponse::NotFound().json(ErrorResponse::new(
            "no_prediction",
            "No prediction has been made in this session yet",
            404,
        ));
    };

    let conversion = match query.currency.as_deref() {
        None => None,
        Some(currency) => {
            let currency = currency.to_ascii_uppercase();
            let table = state.rates.table().await;
            Some(match convert(result.amount_usd, &currency, &table) {
                Ok(amount) => ConversionResponse {
                    currency,
                    amount: Some(amount),
                    formatted: Some(format_amount(amount)),
                    error: None,
                },
                Err(e) => {
                    tracing::info!("Conversion to {} unavailable: {}", currency, e);
                    let error = if table.is_fallback() {
                        "Failed to retrieve exchange rate data.".to_string()
                    } else {
                        e.to_string()
                    };
                    ConversionResponse {
                        currency,
                        amount: None,
                        formatted: None,
                        error: Some(error),
                    }
                }
            })
        }
    };

    HttpResponse::Ok().json(SessionPredictionResponse {
        session_id,
        amount_usd: result.amount_usd,
        formatted: format!("${}", format_amount(result.amount_usd)),
        features: result.features.codes(),
        predicted_at: result.predicted_at,
        conversion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::predictor::{ModelError, Regressor};
    use crate::services::RatesClient;
    use actix_web::{test, App};
    use std::time::Duration;

    struct FlatModel;

    impl Regressor for FlatModel {
        fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
            Ok(vec![100_000.0; rows.len()])
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn state() -> AppState {
        let client = RatesClient::new("http://127.0.0.1:9/latest".to_string(), Duration::from_secs(1)).unwrap();
        AppState {
            predictor: Predictor::new(Arc::new(FlatModel)),
            rates: RatesProvider::new(client, Duration::from_secs(3600)),
            sessions: SessionStore::new(10, Duration::from_secs(60)),
            dataset: Arc::new(Dataset::new(Vec::new())),
        }
    }

    #[actix_web::test]
    async fn test_health_check_reports_model() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"], "stub");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
