use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use skillswap_match::config::{LoggingSettings, Settings};
use skillswap_match::core::Matcher;
use skillswap_match::models::ScoringWeights;
use skillswap_match::routes::{self, matches::{AppState, MatchLimits}};
use skillswap_match::services::{AppwriteClient, AppwriteCollections, CacheManager};
use std::sync::Arc;
use tracing::{info, warn, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
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
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// LOG_LEVEL / LOG_FORMAT override the configured logging section
fn init_logging(configured: &LoggingSettings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| configured.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| configured.format.clone());

    // RUST_LOG wins over LOG_LEVEL when both are set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let loaded = Settings::load();

    match &loaded {
        Ok(settings) => init_logging(&settings.logging),
        Err(_) => init_logging(&LoggingSettings::default()),
    }

    info!("Starting SkillSwap matching service...");

    let settings = loaded.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, format!("Configuration error: {}", e))
    })?;

    info!("Configuration loaded successfully");

    let appwrite = AppwriteClient::new(
        settings.appwrite.endpoint,
        settings.appwrite.api_key,
        settings.appwrite.project_id,
        settings.appwrite.database_id,
        AppwriteCollections {
            user_profiles: settings.collection.user_profiles,
        },
        settings.appwrite.timeout_secs.unwrap_or(30),
    )
    .map_err(|e| {
        error!("Failed to create Appwrite client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    info!("Appwrite client initialized");

    // Redis is optional; fall back to the in-process tier
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(120);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(10_000);

    let cache = match settings.cache.redis_url.as_deref() {
        Some(redis_url) => match CacheManager::new(redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized with Redis (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
                c
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running with in-process cache only", e);
                CacheManager::l1_only(l1_cache_size, cache_ttl)
            }
        },
        None => {
            info!("No Redis configured, using in-process cache (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            CacheManager::l1_only(l1_cache_size, cache_ttl)
        }
    };

    let weights = ScoringWeights {
        skill_points: settings.scoring.skill_points,
        location_bonus: settings.scoring.location_bonus,
    };

    let matcher = Matcher::new(weights);

    info!("Matcher initialized with weights: {:?}", weights);

    let app_state = AppState {
        appwrite: Arc::new(appwrite),
        cache: Arc::new(cache),
        matcher,
        limits: MatchLimits {
            max_limit: settings.matching.max_limit,
            pool_size: settings.matching.pool_size,
        },
        meeting_base_url: settings.meeting.base_url,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
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
