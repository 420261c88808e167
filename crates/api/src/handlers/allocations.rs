//! Handlers for project access allocations.
//!
//! Grants follow the role-administration order: admins allocate level2 and
//! level1 users, level2 allocates level1 users only, and only to projects
//! inside the grantor's own scope.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use sitetrack_core::error::CoreError;
use sitetrack_core::roles::Role;
use sitetrack_core::types::DbId;
use sitetrack_db::repositories::{AllocationRepo, UserRepo};

use crate::error::AppResult;
use crate::middleware::rbac::RequireLevel2;
use crate::response::DataResponse;
use crate::scope::{require_project, resolve_scope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub user_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct RevokedResponse {
    pub revoked: bool,
}

/// GET /projects/{project_id}/allocations
///
/// The project's allocated users.
pub async fn list(
    State(state): State<AppState>,
    RequireLevel2(user): RequireLevel2,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let project = require_project(&state.pool, project_id, &scope).await?;

    let allocations = AllocationRepo::list_for_project(&state.pool, project.id).await?;
    Ok(Json(DataResponse { data: allocations }))
}

/// POST /projects/{project_id}/allocations
///
/// Grant a user access to this project. Idempotent.
pub async fn grant(
    State(state): State<AppState>,
    RequireLevel2(user): RequireLevel2,
    Path(project_id): Path<DbId>,
    Json(body): Json<GrantRequest>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let project = require_project(&state.pool, project_id, &scope).await?;

    let grantee = UserRepo::find_by_id(&state.pool, body.user_id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id: body.user_id })?;
    let grantee_role = Role::parse(&grantee.role)
        .ok_or_else(|| CoreError::Internal(format!("user {} has unknown role", grantee.id)))?;

    if !user.role.assignable_roles().contains(&grantee_role) {
        return Err(CoreError::Forbidden(format!(
            "You may not manage access for '{}'.",
            grantee.username
        ))
        .into());
    }

    let allocation =
        AllocationRepo::grant(&state.pool, grantee.id, project.id, user.user_id).await?;
    tracing::info!(
        user_id = grantee.id,
        project_id = project.id,
        granted_by = user.user_id,
        "Project access granted"
    );
    Ok(Json(DataResponse { data: allocation }))
}

/// DELETE /projects/{project_id}/allocations/{user_id}
///
/// Revoke a user's access to this project.
pub async fn revoke(
    State(state): State<AppState>,
    RequireLevel2(user): RequireLevel2,
    Path((project_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let project = require_project(&state.pool, project_id, &scope).await?;

    let grantee = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id: user_id })?;
    let grantee_role = Role::parse(&grantee.role)
        .ok_or_else(|| CoreError::Internal(format!("user {} has unknown role", grantee.id)))?;
    if !user.role.assignable_roles().contains(&grantee_role) {
        return Err(CoreError::Forbidden(format!(
            "You may not manage access for '{}'.",
            grantee.username
        ))
        .into());
    }

    let revoked = AllocationRepo::revoke(&state.pool, user_id, project.id).await?;
    Ok(Json(DataResponse {
        data: RevokedResponse { revoked },
    }))
}
