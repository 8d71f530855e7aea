use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use matrimony_match::config::Settings;
use matrimony_match::core::default_pool_filter;
use matrimony_match::routes::{self, AppState, MatchContext};
use matrimony_match::services::{CacheManager, PostgresClient};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path parameter errors
fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

/// `LOG_LEVEL`/`LOG_FORMAT` win over the config file; `RUST_LOG` wins over both
fn init_logging(level: &str, format: &str) {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| level.to_string());
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| format.to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(what: &str, e: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", what, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", what, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let loaded = match std::env::var("CONFIG_PATH") {
        Ok(path) => Settings::load_from(path),
        Err(_) => Settings::load(),
    };
    let settings = loaded.map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging.level, &settings.logging.format);
    info!("Starting matrimony matching service...");

    let matcher = settings
        .matcher()
        .map_err(|e| startup_error("Invalid scoring configuration", e))?;
    info!("Matcher initialized with {} total weight points", matcher.weights().total());

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(10_000);
    let cache = CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl)
        .await
        .map_err(|e| startup_error("Failed to connect to Redis", e))?;
    info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);

    let postgres = PostgresClient::from_settings(&settings.database)
        .await
        .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;
    info!(
        "PostgreSQL client initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    let context = Arc::new(MatchContext {
        matcher,
        pool_filter: Box::new(default_pool_filter()),
        matching: settings.matching.clone(),
    });
    let app_state = AppState {
        cache: Arc::new(cache),
        postgres: Arc::new(postgres),
        context: context.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::from(context.clone()))
            .app_data(web::JsonConfig::default().limit(4 * 1024 * 1024).error_handler(handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
