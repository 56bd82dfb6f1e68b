use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::core::SwipeError;
use crate::models::{
    ErrorResponse, MatchListResponse, MatchView, MessageResponse, SwipeRequest, SwipeResponse,
};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/swipe", web::post().to(record_swipe))
        .route("/matches", web::get().to(list_matches));
}

/// Record a swipe and report whether it completed a match
///
/// POST /api/swipe
///
/// Request body:
/// ```json
/// {
///   "swiped_id": 42,
///   "direction": "left|right"
/// }
/// ```
async fn record_swipe(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<SwipeRequest>,
) -> Result<HttpResponse, SwipeError> {
    if let Err(errors) = req.validate() {
        tracing::info!(
            "Validation failed for swipe from {}: field_errors={:?}",
            user.user_id,
            errors
        );
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        }));
    }

    let outcome = state
        .engine
        .record_swipe(user.user_id, req.swiped_id, &req.direction)
        .await?;

    if !outcome.created {
        return Ok(HttpResponse::Ok().json(MessageResponse {
            message: "already swiped".to_string(),
        }));
    }

    tracing::info!(
        "User {} swiped {} on {} (match: {})",
        user.user_id,
        req.direction,
        req.swiped_id,
        outcome.match_formed
    );

    Ok(HttpResponse::Created().json(SwipeResponse {
        status: "swipe recorded".to_string(),
        match_made: outcome.match_formed,
    }))
}

/// The caller's matches, most recent first
///
/// GET /api/matches
async fn list_matches(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, SwipeError> {
    let matches: Vec<MatchView> = state
        .engine
        .matches_for(user.user_id)
        .await?
        .into_iter()
        .filter_map(|m| {
            m.pair.other(user.user_id).map(|other| MatchView {
                user_id: other,
                matched_at: m.created_at,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(MatchListResponse {
        count: matches.len(),
        matches,
    }))
}
