use crate::models::{
    Attribute, AttributeKind, Preference, PreferenceError, PreferenceResponse,
    UpdatePreferenceRequest,
};
use crate::routes::matches::{error_response, storage_error, AppState};
use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profiles/{user_id}/preferences", web::post().to(update_preference));
}

/// Turn the request's raw strings into a validated preference.
///
/// Numeric attributes read `min`/`max` when either is present and fall back
/// to a single `preference` string such as `"25-30"`.
fn parse_preference(
    attribute: Attribute,
    req: &UpdatePreferenceRequest,
) -> Result<Preference, PreferenceError> {
    match attribute.kind() {
        AttributeKind::Numeric(_) if req.min.is_some() || req.max.is_some() => {
            Preference::range(req.min.as_deref(), req.max.as_deref(), attribute)
        }
        _ => Preference::parse(req.preference.as_deref(), attribute),
    }
}

/// Update one preference on a stored profile
///
/// POST /api/v1/profiles/{userId}/preferences
///
/// Request body:
/// ```json
/// {
///   "attribute": "diet",
///   "preference": "vegetarian",
///   "isDealbreaker": true
/// }
/// ```
async fn update_preference(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdatePreferenceRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors);
    }
    let user_id = path.into_inner();

    let attribute: Attribute = match req.attribute.parse() {
        Ok(attribute) => attribute,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, "Unknown attribute", e),
    };
    let preference = match parse_preference(attribute, &req) {
        Ok(preference) => preference,
        Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, "Invalid preference", e),
    };

    // Read through to the database so a stale cached copy is never written back
    let mut profile = match state.postgres.fetch_profile(&user_id).await {
        Ok(profile) => profile,
        Err(e) => return storage_error("Failed to fetch user profile", e),
    };

    let applied = profile
        .preferences
        .set_preference(attribute, preference)
        .and_then(|_| match req.is_dealbreaker {
            Some(flag) => profile.preferences.set_dealbreaker(attribute, flag),
            None => Ok(()),
        });
    if let Err(e) = applied {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "Invalid preference", e);
    }

    if let Err(e) = state.postgres.save_profile(&profile).await {
        return storage_error("Failed to save profile", e);
    }
    if let Err(e) = state.cache.invalidate_profile(&user_id).await {
        tracing::warn!("Failed to invalidate cache for {}: {}", user_id, e);
    }

    tracing::info!("Updated {} preference for user {}", attribute, user_id);

    HttpResponse::Ok().json(PreferenceResponse {
        user_id,
        attribute: attribute.name().to_string(),
        entry: profile.preferences.entry(attribute).cloned(),
    })
}
