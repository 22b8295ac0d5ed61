use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use services::AppState;

// Recorded drill audio stays well under this.
const MAX_AUDIO_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn create_router(app_state: std::sync::Arc<services::AppState>) -> Router {
    // The browser client calls these endpoints directly.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any); // TODO: restrict to specific origins in production

    Router::new()
        // Public endpoints (no auth required)
        .route("/health", get(handlers::health_check))
        // Metrics endpoint with Basic Auth protection
        .route(
            "/metrics",
            get(handlers::metrics_handler)
                .layer(middleware::from_fn(handlers::metrics_auth_middleware)),
        )
        .nest("/api/v1/drills", drills_routes())
        .nest("/api/v1/progress", progress_routes())
        .nest("/api/v1/ai", ai_routes())
        .nest("/api/v1/migrate", migrate_routes())
        .with_state(app_state)
        .layer(cors)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn drills_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/today", get(handlers::drills::get_todays_drill))
        .route("/recent", get(handlers::drills::list_recent_drills))
}

fn progress_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route(
            "/",
            get(handlers::progress::get_progress).delete(handlers::progress::clear_progress),
        )
        .route("/submissions", post(handlers::progress::submit_drill))
}

fn ai_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/feedback", post(handlers::feedback::transcribe_and_feedback))
        .layer(DefaultBodyLimit::max(MAX_AUDIO_UPLOAD_BYTES))
}

fn migrate_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/progress", post(handlers::migrate::migrate_progress))
        .route("/local", post(handlers::migrate::migrate_local_progress))
}
