//! Health check endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

/// Routes mounted at the application root.
///
/// ```text
/// GET /health -> health check (includes a database ping)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = sitetrack_db::health_check(&state.pool).await.is_ok();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "db_healthy": db_healthy,
    }))
}
