use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use salary_estimator::config::{LogFormat, Settings};
use salary_estimator::core::predictor::{ModelState, Regressor};
use salary_estimator::routes::{self, AppState};
use salary_estimator::services::{Dataset, ModelArtifact, RatesClient, RatesProvider, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(default_level: &str, default_format: &str) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| default_level.to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| default_format.to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match LogFormat::parse(&log_format) {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Text => subscriber.init(),
    }
}

fn fatal(message: String) -> std::io::Error {
    error!("{}", message);
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Configuration comes first so logging can honour its [logging] section
    let settings = Settings::load();
    let (level, format) = match &settings {
        Ok(s) => (s.logging.level.clone(), s.logging.format.clone()),
        Err(_) => ("info".to_string(), "json".to_string()),
    };
    init_logging(&level, &format);

    info!("Starting salary estimation service...");

    let settings = settings.map_err(|e| fatal(format!("Failed to load configuration: {}", e)))?;

    info!("Configuration loaded successfully");

    // The model is loaded exactly once; without it the service refuses to start
    let model_path = settings.model.path.clone();
    let state = ModelState::initialize(|| {
        ModelArtifact::load(&model_path).map(|model| Arc::new(model) as Arc<dyn Regressor>)
    });
    let predictor = match state {
        ModelState::Ready(predictor) => predictor,
        ModelState::Failed(reason) => {
            return Err(fatal(format!("ModelUnavailable: {}. Export the trained pipeline to '{}'", reason, model_path)));
        }
        ModelState::Uninitialized => return Err(fatal("ModelUnavailable: model was never loaded".to_string())),
    };

    info!("Predictor ready ({} model)", predictor.model_name());

    let dataset = Dataset::load(&settings.dataset.path)
        .map_err(|e| fatal(format!("Failed to load dataset: {}", e)))?;

    let rates_client = RatesClient::new(settings.rates.endpoint.clone(), settings.rates.timeout())
        .map_err(|e| fatal(format!("Failed to create HTTP client: {}", e)))?;
    let rates = RatesProvider::new(rates_client, settings.rates.refresh());

    info!(
        "Exchange rates from {} (refresh: {}s, timeout: {}s)",
        settings.rates.endpoint, settings.rates.refresh_secs, settings.rates.timeout_secs
    );

    let sessions = SessionStore::new(
        settings.session.max_sessions,
        Duration::from_secs(settings.session.idle_timeout_secs),
    );

    let app_state = AppState {
        predictor,
        rates,
        sessions,
        dataset: Arc::new(dataset),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .configure(routes::configure_extractors)
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
