//! Route definitions for the `/inspections` resource.
//!
//! Creation and listing are project-scoped and live under `/projects`.

use axum::routing::get;
use axum::Router;

use crate::handlers::inspections;
use crate::state::AppState;

/// Routes mounted at `/inspections`.
///
/// ```text
/// GET /{id} -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(inspections::get_by_id))
}
