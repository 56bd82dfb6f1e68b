// Route exports
pub mod health;
pub mod profiles;
pub mod swipes;

use actix_web::web;
use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::core::{CandidateSelector, MatchEngine, RatioCalculator};
use crate::services::SwipeStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SwipeStore>,
    pub engine: MatchEngine,
    pub selector: CandidateSelector,
    pub keys: JwtKeys,
}

impl AppState {
    pub fn new(store: Arc<dyn SwipeStore>, keys: JwtKeys) -> Self {
        let ratios = RatioCalculator::new(store.clone());
        Self {
            engine: MatchEngine::new(store.clone()),
            selector: CandidateSelector::new(store.clone(), ratios),
            store,
            keys,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(health::configure)
            .configure(profiles::configure)
            .configure(swipes::configure),
    );
}

/// Cross-origin policy built from configuration
///
/// With no configured origins every cross-origin request is refused.
pub fn cors_policy(settings: &crate::config::CorsSettings) -> actix_cors::Cors {
    let cors = actix_cors::Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![
            actix_web::http::header::AUTHORIZATION,
            actix_web::http::header::CONTENT_TYPE,
        ])
        .max_age(settings.max_age_secs);

    if settings.allows_any_origin() {
        return cors.allow_any_origin();
    }

    settings
        .allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}
