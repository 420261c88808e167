//! Route definitions for the `/issues` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::issues;
use crate::state::AppState;

/// Routes mounted at `/issues`.
///
/// ```text
/// GET  /             -> list
/// GET  /{id}         -> get_by_id
/// POST /{id}/status  -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(issues::list))
        .route("/{id}", get(issues::get_by_id))
        .route("/{id}/status", post(issues::update_status))
}
