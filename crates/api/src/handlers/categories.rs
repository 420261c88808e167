//! Handlers for categories: structure management within a project.
//!
//! Category status is display state, edited directly; it is not derived
//! from task percentages.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use sitetrack_core::error::CoreError;
use sitetrack_core::types::DbId;
use sitetrack_db::models::category::{CreateCategory, UpdateCategory};
use sitetrack_db::repositories::CategoryRepo;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::rbac::RequireLevel2;
use crate::response::DataResponse;
use crate::scope::{require_mutable_project, resolve_scope};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// POST /projects/{project_id}/categories
///
/// Create a category. Duplicate names within the project are a conflict.
pub async fn create(
    State(state): State<AppState>,
    RequireLevel2(user): RequireLevel2,
    Path(project_id): Path<DbId>,
    Json(body): Json<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let scope = resolve_scope(&state.pool, &user).await?;
    let project = require_mutable_project(&state.pool, project_id, &scope).await?;

    let category = CategoryRepo::create(&state.pool, project.id, &body).await?;
    tracing::info!(category_id = category.id, project_id = project.id, "Category created");
    Ok(Json(DataResponse { data: category }))
}

/// PUT /categories/{id}
///
/// Update category metadata or display status.
pub async fn update(
    State(state): State<AppState>,
    RequireLevel2(user): RequireLevel2,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateCategory>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    if let Some(status) = &body.status {
        if !matches!(status.as_str(), "in_progress" | "completed" | "late") {
            return Err(CoreError::Validation(format!("Unknown category status '{status}'")).into());
        }
    }

    let scope = resolve_scope(&state.pool, &user).await?;
    let category = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Category", id })?;
    require_mutable_project(&state.pool, category.project_id, &scope).await?;

    let updated = CategoryRepo::update(&state.pool, id, &body)
        .await?
        .ok_or(CoreError::NotFound { entity: "Category", id })?;
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /categories/{id}
///
/// Delete a category. Tasks cascade; dependent issues or journal rows make
/// this a conflict.
pub async fn delete(
    State(state): State<AppState>,
    RequireLevel2(user): RequireLevel2,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let category = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Category", id })?;
    require_mutable_project(&state.pool, category.project_id, &scope).await?;

    let deleted = CategoryRepo::delete(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: DeletedResponse { deleted },
    }))
}
