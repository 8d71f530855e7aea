use crate::config::MatchingSettings;
use crate::core::{is_mutual_match, CandidatePoolFilter, MatchResult, Matcher};
use crate::models::{
    BoostActivation, ErrorResponse, ExplainRequest, ExplainResponse, FindMatchesRequest,
    FindMatchesResponse, HealthResponse, InterestAction, InterestRequest, InterestResponse,
    MatchStatus, Profile, ProfileRecord, RankRequest,
};
use crate::services::{CacheManager, PostgresClient, PostgresError};
use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use validator::Validate;

/// Everything the stateless matching endpoints need
pub struct MatchContext {
    pub matcher: Matcher,
    pub pool_filter: Box<dyn CandidatePoolFilter>,
    pub matching: MatchingSettings,
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheManager>,
    pub postgres: Arc<PostgresClient>,
    pub context: Arc<MatchContext>,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/matches/rank", web::post().to(rank_candidates))
        .route("/matches/explain", web::post().to(explain_match))
        .route("/matches/interest", web::post().to(record_interest));
}

pub(crate) fn error_response(status: StatusCode, error: &str, message: impl ToString) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
        status_code: status.as_u16(),
    })
}

pub(crate) fn storage_error(context: &str, e: PostgresError) -> HttpResponse {
    match e {
        PostgresError::NotFound(what) => error_response(StatusCode::NOT_FOUND, "Not found", what),
        PostgresError::InvalidInput(msg) => error_response(StatusCode::BAD_REQUEST, "Invalid input", msg),
        other => {
            tracing::error!("{}: {}", context, other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, context, other)
        }
    }
}

/// Profile by user id, through the cache.
///
/// Cache failures only cost a database read.
pub(crate) async fn load_profile(state: &AppState, user_id: &str) -> Result<Profile, PostgresError> {
    match state.cache.get_profile(user_id).await {
        Ok(Some(profile)) => return Ok(profile),
        Ok(None) => {}
        Err(e) => tracing::warn!("Profile cache read failed for {}: {}", user_id, e),
    }

    let profile = state.postgres.fetch_profile(user_id).await?;
    if let Err(e) = state.cache.put_profile(&profile).await {
        tracing::warn!("Profile cache write failed for {}: {}", user_id, e);
    }
    Ok(profile)
}

/// Persist referral boosts observed during ranking without holding up the
/// response. The write is idempotent, so racing requests are harmless.
fn persist_boost_activations(state: &AppState, activations: &[BoostActivation], candidates: &[Profile]) {
    let pending: Vec<(BoostActivation, String)> = activations
        .iter()
        .filter_map(|a| {
            candidates
                .iter()
                .find(|c| c.id == a.profile_id)
                .map(|c| (a.clone(), c.user_id.clone()))
        })
        .collect();
    if pending.is_empty() {
        return;
    }

    let postgres = state.postgres.clone();
    let cache = state.cache.clone();
    tokio::spawn(async move {
        for (activation, user_id) in pending {
            match postgres
                .activate_referral_boost(&activation.profile_id, activation.started_at)
                .await
            {
                Ok(true) => {
                    if let Err(e) = cache.invalidate_profile(&user_id).await {
                        tracing::warn!("Failed to invalidate cache for {}: {}", user_id, e);
                    }
                }
                Ok(false) => {}
                Err(e) => tracing::warn!(
                    "Failed to persist referral boost for {}: {}",
                    activation.profile_id,
                    e
                ),
            }
        }
    });
}

fn build_response(result: MatchResult, include_near_matches: bool, started: Instant) -> FindMatchesResponse {
    let (near_matches, blockers) = if include_near_matches {
        (result.near_matches, result.blockers)
    } else {
        (Vec::new(), Vec::new())
    };

    FindMatchesResponse {
        matches: result.fresh,
        mutual_matches: result.mutual,
        near_matches,
        blockers,
        boost_activations: result.boost_activations,
        total_candidates: result.total_candidates,
        execution_time_ms: started.elapsed().as_millis() as u64,
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);
    let cache_healthy = state.cache.ping().await.is_ok();
    tracing::debug!("Health check: postgres={} cache={} {:?}", pg_healthy, cache_healthy, state.cache.stats());

    let status = match (pg_healthy, cache_healthy) {
        (true, true) => "healthy",
        (true, false) => "degraded",
        _ => "unhealthy",
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Find matches for a stored profile
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "limit": 20,
///   "offset": 0,
///   "includeNearMatches": true
/// }
/// ```
async fn find_matches(state: web::Data<AppState>, req: web::Json<FindMatchesRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let started = Instant::now();
    let ctx = &state.context;
    let limit = ctx.matching.page_limit(req.limit);
    let offset = req.offset.unwrap_or(0) as usize;

    tracing::info!("Finding matches for user: {}, limit: {}, offset: {}", req.user_id, limit, offset);

    let seeker = match load_profile(&state, &req.user_id).await {
        Ok(profile) => profile,
        Err(e) => return storage_error("Failed to fetch user profile", e),
    };

    let candidates = match state
        .postgres
        .fetch_candidate_pool(&seeker, ctx.matching.max_candidates)
        .await
    {
        Ok(candidates) => candidates,
        Err(e) => return storage_error("Failed to query candidates", e),
    };

    // Without history every prior interaction would reappear as fresh
    let history = match state.postgres.fetch_interactions(&req.user_id).await {
        Ok(history) => history,
        Err(e) => return storage_error("Failed to fetch interaction history", e),
    };

    let result = ctx
        .matcher
        .rank(&seeker, &candidates, &history, ctx.pool_filter.as_ref(), Utc::now());
    persist_boost_activations(&state, &result.boost_activations, &candidates);

    let mut response = build_response(result.paginate(offset, limit), req.include_near_matches, started);
    // Already persisted on the server side
    response.boost_activations.clear();

    tracing::info!(
        "Returning {} matches, {} mutual, {} near for user {} (from {} candidates) in {}ms",
        response.matches.len(),
        response.mutual_matches.len(),
        response.near_matches.len(),
        req.user_id,
        response.total_candidates,
        response.execution_time_ms
    );

    HttpResponse::Ok().json(response)
}

/// Rank an inline candidate list.
///
/// POST /api/v1/matches/rank
///
/// Stateless: nothing is read from or written to storage. Referral boosts
/// started during ranking are returned in `boostActivations` for the caller
/// to persist. Candidate records without an id or gender are skipped; such a
/// seeker record is rejected with 422.
async fn rank_candidates(ctx: web::Data<MatchContext>, req: web::Json<RankRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let started = Instant::now();
    let RankRequest { seeker, candidates, history, limit, offset } = req.into_inner();

    let seeker = match Profile::try_from(seeker) {
        Ok(profile) => profile,
        Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, "Invalid seeker profile", e),
    };

    let candidates: Vec<Profile> = candidates
        .into_iter()
        .filter_map(|record: ProfileRecord| {
            let id = record.id.clone();
            match Profile::try_from(record) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Skipping candidate {}: {}", id, e);
                    None
                }
            }
        })
        .collect();

    let result = ctx
        .matcher
        .rank(&seeker, &candidates, &history, ctx.pool_filter.as_ref(), Utc::now())
        .paginate(offset.unwrap_or(0) as usize, ctx.matching.page_limit(limit));

    tracing::info!(
        "Ranked {} inline candidates for {}: {} matches, {} near",
        result.total_candidates,
        seeker.user_id,
        result.fresh.len(),
        result.near_matches.len()
    );

    HttpResponse::Ok().json(build_response(result, true, started))
}

/// Explain one pair
///
/// POST /api/v1/matches/explain
async fn explain_match(state: web::Data<AppState>, req: web::Json<ExplainRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }

    let seeker = match load_profile(&state, &req.user_id).await {
        Ok(profile) => profile,
        Err(e) => return storage_error("Failed to fetch user profile", e),
    };
    let candidate = match load_profile(&state, &req.candidate_user_id).await {
        Ok(profile) => profile,
        Err(e) => return storage_error("Failed to fetch candidate profile", e),
    };
    let history = match state.postgres.fetch_interactions(&req.user_id).await {
        Ok(history) => history,
        Err(e) => return storage_error("Failed to fetch interaction history", e),
    };

    let today = Utc::now().date_naive();
    HttpResponse::Ok().json(ExplainResponse {
        is_mutual_match: is_mutual_match(&seeker, &candidate, today),
        interest_status: history.status_between(&seeker.user_id, &candidate.user_id),
        explanation: state.context.matcher.explain(&seeker, &candidate, today),
    })
}

/// Record an interaction
///
/// POST /api/v1/matches/interest
///
/// Sending interest to someone whose own interest is still pending accepts
/// it instead.
async fn record_interest(state: web::Data<AppState>, req: web::Json<InterestRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }
    let (user, target) = (req.user_id.as_str(), req.target_user_id.as_str());

    let history = match state.postgres.fetch_interactions(user).await {
        Ok(history) => history,
        Err(e) => return storage_error("Failed to fetch interaction history", e),
    };
    let pending_from_target = history
        .matches
        .iter()
        .any(|m| m.sender_id == target && m.receiver_id == user && m.status == MatchStatus::Pending);

    let write = match req.action {
        InterestAction::Send if pending_from_target => {
            state.postgres.respond_to_interest(target, user, MatchStatus::Accepted).await
        }
        InterestAction::Send => state.postgres.record_interest(user, target).await.map(|_| ()),
        InterestAction::Accept => {
            state.postgres.respond_to_interest(target, user, MatchStatus::Accepted).await
        }
        InterestAction::Reject => {
            state.postgres.respond_to_interest(target, user, MatchStatus::Rejected).await
        }
        InterestAction::Decline => state.postgres.record_decline(user, target).await,
    };
    if let Err(e) = write {
        return storage_error("Failed to record interest", e);
    }

    let interest_status = match state.postgres.fetch_interactions(user).await {
        Ok(history) => history.status_between(user, target),
        Err(e) => return storage_error("Failed to fetch interaction history", e),
    };

    tracing::debug!("{} -> {} {:?}: now {:?}", user, target, req.action, interest_status);

    HttpResponse::Ok().json(InterestResponse {
        success: true,
        interest_status,
    })
}
