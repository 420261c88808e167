//! Route definitions.

pub mod auth;
pub mod health;
pub mod inspections;
pub mod issues;
pub mod projects;
pub mod structure;

use axum::Router;

use crate::state::AppState;

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/projects", projects::router())
        .nest("/categories", structure::category_router())
        .nest("/tasks", structure::task_router())
        .nest("/issues", issues::router())
        .nest("/inspections", inspections::router())
}
