//! Router configuration for the HTTP API.

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;
use crate::config::AppConfig;

/// Create the main application router.
pub fn create_router(state: AppState, config: &AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let uploads = ServeDir::new(state.controller.images().root());

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/tours",
            get(handlers::list_tours).post(handlers::create_tour),
        )
        .route(
            "/tours/{id}",
            get(handlers::get_tour)
                .put(handlers::update_tour)
                .delete(handlers::delete_tour),
        )
        .nest_service(&config.uploads.public_prefix, uploads)
        .layer(DefaultBodyLimit::max(config.server.max_upload_mb * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
