pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::pdf::handlers;
use crate::state::AppState;

/// Resume payloads can carry long free-text sections.
const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/pdf/health", get(health::pdf_health_handler))
        .route("/api/pdf/generate", post(handlers::handle_generate_resume))
        .route(
            "/api/pdf/generate-cover-letter",
            post(handlers::handle_generate_cover_letter),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}
