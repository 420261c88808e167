//! Route definitions for the `/projects` resource.
//!
//! Also nests category creation, issues, inspections and allocations under
//! `/projects/{project_id}/...`.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{allocations, categories, inspections, issues, projects};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                    -> list
/// POST   /                                    -> create
/// GET    /overview                            -> overview
/// GET    /{id}                                -> get_by_id
/// PUT    /{id}                                -> update
/// DELETE /{id}                                -> delete (soft)
/// POST   /{id}/finalize                       -> finalize
/// GET    /{id}/timeline                       -> timeline
/// GET    /{id}/report                         -> report
///
/// POST   /{project_id}/categories             -> categories::create
/// POST   /{project_id}/issues                 -> issues::create
/// GET    /{project_id}/inspections            -> inspections::list_by_project
/// POST   /{project_id}/inspections            -> inspections::create
/// GET    /{project_id}/allocations            -> allocations::list
/// POST   /{project_id}/allocations            -> allocations::grant
/// DELETE /{project_id}/allocations/{user_id}  -> allocations::revoke
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list).post(projects::create))
        .route("/overview", get(projects::overview))
        .route(
            "/{id}",
            get(projects::get_by_id)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route("/{id}/finalize", post(projects::finalize))
        .route("/{id}/timeline", get(projects::timeline))
        .route("/{id}/report", get(projects::report))
        .route("/{project_id}/categories", post(categories::create))
        .route("/{project_id}/issues", post(issues::create))
        .route(
            "/{project_id}/inspections",
            get(inspections::list_by_project).post(inspections::create),
        )
        .route(
            "/{project_id}/allocations",
            get(allocations::list).post(allocations::grant),
        )
        .route(
            "/{project_id}/allocations/{user_id}",
            delete(allocations::revoke),
        )
}
