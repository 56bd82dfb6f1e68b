use actix_web::{web, HttpResponse};

use crate::auth::AuthenticatedUser;
use crate::core::SwipeError;
use crate::models::UserView;
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profiles", web::get().to(list_profiles))
        .route("/me", web::get().to(current_user));
}

/// Deck of profiles the caller has not swiped on yet
///
/// GET /api/profiles
async fn list_profiles(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, SwipeError> {
    let deck = state.selector.next_deck(user.user_id).await?;

    tracing::info!("Returning {} profiles for user {}", deck.len(), user.user_id);

    Ok(HttpResponse::Ok().json(deck))
}

/// The caller's identity and own profile card
///
/// GET /api/me
async fn current_user(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, SwipeError> {
    let record = state
        .store
        .find_user(user.user_id)
        .await?
        .ok_or_else(|| SwipeError::NotFound(format!("user {}", user.user_id)))?;

    let card = match state.store.profile_for_user(record.id).await? {
        Some(profile) => Some(state.selector.card(&profile).await?),
        None => None,
    };

    Ok(HttpResponse::Ok().json(UserView::new(&record, card)))
}
