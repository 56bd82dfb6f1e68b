use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use swipe_match::auth::JwtKeys;
use swipe_match::config::{DatabaseBackend, LogFormat, Settings};
use swipe_match::error::{handle_json_payload_error, handle_query_payload_error};
use swipe_match::routes::{self, AppState};
use swipe_match::services::{MemoryStore, PostgresStore, SwipeStore};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(settings: &Settings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match settings.logging.format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Compact => subscriber.compact().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings);

    info!("Starting swipe-match service...");

    let store: Arc<dyn SwipeStore> = match settings.database.backend {
        DatabaseBackend::Postgres => {
            let postgres = PostgresStore::from_settings(&settings.database)
                .await
                .map_err(|e| {
                    error!("Failed to connect to PostgreSQL: {}", e);
                    std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
                })?;
            info!("PostgreSQL store initialized");
            Arc::new(postgres)
        }
        DatabaseBackend::Memory => {
            warn!("Using in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let app_state = AppState::new(store, JwtKeys::from_secret(&settings.auth.jwt_secret));

    match app_state.engine.reconcile_matches().await {
        Ok(0) => info!("Match ledger consistent"),
        Ok(n) => warn!("Reconciled {} missing matches", n),
        Err(e) => error!("Match reconciliation failed: {}", e),
    }

    if settings.cors.allowed_origins.is_empty() {
        info!("CORS: no cross-origin access configured");
    } else {
        info!("CORS: allowing origins {:?}", settings.cors.allowed_origins);
    }

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);
    let cors_settings = settings.cors.clone();

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(routes::cors_policy(&cors_settings))
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
