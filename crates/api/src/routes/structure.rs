//! Route definitions for categories and tasks addressed by their own ids.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::{categories, tasks};
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// PUT    /{id}        -> categories::update
/// DELETE /{id}        -> categories::delete
/// POST   /{id}/tasks  -> tasks::create
/// ```
pub fn category_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/{category_id}/tasks", post(tasks::create))
}

/// Routes mounted at `/tasks`.
///
/// ```text
/// PUT    /{id}          -> tasks::update
/// DELETE /{id}          -> tasks::delete
/// PUT    /{id}/percent  -> tasks::update_percent
/// ```
pub fn task_router() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(tasks::update).delete(tasks::delete))
        .route("/{id}/percent", put(tasks::update_percent))
}
