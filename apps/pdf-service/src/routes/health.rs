use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "PDF Service is running",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/pdf/health
/// Also reports whether the headless browser has been started.
pub async fn pdf_health_handler(State(state): State<AppState>) -> Json<Value> {
    let browser = if state.browser.is_running().await {
        "running"
    } else {
        "idle"
    };

    Json(json!({
        "status": "PDF Service is running",
        "timestamp": Utc::now().to_rfc3339(),
        "browser": browser,
    }))
}
