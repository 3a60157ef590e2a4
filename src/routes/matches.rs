use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use validator::Validate;
use crate::models::{
    CandidateFilter, ErrorResponse, FindMatchesRequest, HealthResponse, RankMatchesRequest,
    RankMatchesResponse, UserProfile,
};
use crate::services::{AppwriteClient, AppwriteError, CacheKey, CacheManager};
use crate::core::{validate_browse_filter, MatchError, Matcher};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub appwrite: Arc<AppwriteClient>,
    pub cache: Arc<CacheManager>,
    pub matcher: Matcher,
    pub limits: MatchLimits,
    pub meeting_base_url: String,
}

/// Bounds applied to match requests
#[derive(Debug, Clone, Copy)]
pub struct MatchLimits {
    /// Hard cap on the number of matches returned
    pub max_limit: u16,
    /// Number of candidate profiles fetched from the store per request
    pub pool_size: usize,
}

impl Default for MatchLimits {
    fn default() -> Self {
        Self {
            max_limit: 100,
            pool_size: 500,
        }
    }
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/rank", web::post().to(rank_matches))
        .route("/matches/find", web::post().to(find_matches))
        .route("/matches/invalidate", web::post().to(invalidate_user));
}

pub(crate) fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn invalid_argument(err: MatchError) -> HttpResponse {
    error_response(
        actix_web::http::StatusCode::BAD_REQUEST,
        "InvalidArgument",
        err.to_string(),
    )
}

fn store_error(context: &str, err: AppwriteError) -> HttpResponse {
    let (status, label) = match &err {
        AppwriteError::NotFound(_) => (actix_web::http::StatusCode::NOT_FOUND, context),
        // The service's own store credentials were rejected, not the caller's
        AppwriteError::Unauthorized => (actix_web::http::StatusCode::BAD_GATEWAY, "StoreUnauthorized"),
        _ => (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, context),
    };
    error_response(status, label, err.to_string())
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.cache.has_redis() { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Rank a caller-supplied candidate pool
///
/// POST /api/v1/matches/rank
///
/// Request body:
/// ```json
/// {
///   "requester": { "uid": "u1", "skillsToTeach": ["Guitar"], "skillsToLearn": ["Spanish"] },
///   "candidates": [ { "uid": "u2", "skillsToTeach": ["Spanish"], "skillsToLearn": ["Guitar"] } ],
///   "limit": 20
/// }
/// ```
async fn rank_matches(
    state: web::Data<AppState>,
    req: web::Json<RankMatchesRequest>,
) -> impl Responder {
    let req = req.into_inner();

    let Some(requester) = req.requester else {
        return invalid_argument(MatchError::InvalidArgument("requester is required".to_string()));
    };

    let total_candidates = req.candidates.len();

    let mut matches = match state.matcher.rank_matches(&requester, &req.candidates) {
        Ok(matches) => matches,
        Err(e) => return invalid_argument(e),
    };

    if let Some(limit) = req.limit {
        matches.truncate(limit.min(state.limits.max_limit) as usize);
    }

    tracing::info!(
        "Ranked {} matches for user {} (from {} candidates)",
        matches.len(),
        requester.uid,
        total_candidates
    );

    HttpResponse::Ok().json(RankMatchesResponse {
        matches,
        total_candidates,
    })
}

/// Find matches for a stored user
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "limit": 20,
///   "teach": "string",
///   "learn": "string",
///   "location": "string"
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return error_response(
            actix_web::http::StatusCode::BAD_REQUEST,
            "Validation failed",
            errors.to_string(),
        );
    }

    let filter = req.filter();
    if let Err(e) = validate_browse_filter(&filter) {
        return invalid_argument(e);
    }

    let user_id = &req.user_id;
    let limit = req.limit.min(state.limits.max_limit) as usize;

    tracing::info!("Finding matches for user: {}, limit: {}", user_id, limit);

    let requester = match load_profile(&state, user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("Failed to fetch profile for {}: {}", user_id, e);
            return store_error("Failed to fetch user profile", e);
        }
    };

    let candidates = match load_pool(&state, user_id, &filter).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to list candidates for {}: {}", user_id, e);
            return store_error("Failed to list candidates", e);
        }
    };

    tracing::debug!("Loaded {} candidates for {}", candidates.len(), user_id);

    let result = match state.matcher.find_matches(&requester, &candidates, &filter, limit) {
        Ok(result) => result,
        Err(e) => return invalid_argument(e),
    };

    tracing::info!(
        "Returning {} matches for user {} (from {} candidates)",
        result.matches.len(),
        user_id,
        result.total_candidates
    );

    HttpResponse::Ok().json(RankMatchesResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
    })
}

#[derive(Debug, Deserialize, Validate)]
struct InvalidateRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    user_id: String,
}

/// Drop cached reads after a user's profile changed
///
/// The edited profile can sit in any requester's cached pool, so every pool
/// entry goes along with the user's own profile entry.
///
/// POST /api/v1/matches/invalidate
async fn invalidate_user(
    state: web::Data<AppState>,
    req: web::Json<InvalidateRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(
            actix_web::http::StatusCode::BAD_REQUEST,
            "Validation failed",
            errors.to_string(),
        );
    }

    if let Err(e) = state.cache.delete(&CacheKey::profile(&req.user_id)).await {
        tracing::warn!("Failed to invalidate profile cache: {}", e);
    }
    if let Err(e) = state.cache.invalidate_prefix(CacheKey::ALL_POOLS).await {
        tracing::warn!("Failed to invalidate pool cache: {}", e);
    }

    tracing::info!("Invalidated cached reads after profile change for {}", req.user_id);

    HttpResponse::NoContent().finish()
}

/// Profile lookup through the cache; cache failures fall back to the store
async fn load_profile(state: &AppState, uid: &str) -> Result<UserProfile, AppwriteError> {
    let key = CacheKey::profile(uid);

    match state.cache.get::<UserProfile>(&key).await {
        Ok(profile) => return Ok(profile),
        Err(e) => tracing::trace!("Profile cache lookup for {} failed: {}", uid, e),
    }

    let profile = state.appwrite.get_profile(uid).await?;

    if let Err(e) = state.cache.set(&key, &profile).await {
        tracing::warn!("Failed to cache profile {}: {}", uid, e);
    }

    Ok(profile)
}

async fn load_pool(
    state: &AppState,
    uid: &str,
    filter: &CandidateFilter,
) -> Result<Vec<UserProfile>, AppwriteError> {
    let key = CacheKey::pool(uid, &filter.fingerprint());

    match state.cache.get::<Vec<UserProfile>>(&key).await {
        Ok(pool) => return Ok(pool),
        Err(e) => tracing::trace!("Pool cache lookup for {} failed: {}", uid, e),
    }

    let pool = state
        .appwrite
        .list_profiles(uid, filter, state.limits.pool_size)
        .await?;

    if let Err(e) = state.cache.set(&key, &pool).await {
        tracing::warn!("Failed to cache candidate pool for {}: {}", uid, e);
    }

    Ok(pool)
}
