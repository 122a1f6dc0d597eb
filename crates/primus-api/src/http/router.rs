//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/` except `/health`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Catalog (public)
        .route("/catalog", get(handlers::catalog::get_catalog))
        // Dry-run validation
        .route("/rules/validate", post(handlers::rules::validate_draft))
        // Character CRUD
        .route(
            "/characters",
            post(handlers::character::create_character).get(handlers::character::list_characters),
        )
        .route("/characters/stats", get(handlers::character::character_stats))
        .route(
            "/characters/{id}",
            get(handlers::character::get_character)
                .put(handlers::character::update_character)
                .delete(handlers::character::delete_character),
        )
        .route(
            "/characters/{id}/sheet",
            get(handlers::character::get_character_sheet),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
