//! Per-request access scope resolution.
//!
//! Builds the caller's [`AccessScope`] from its role and allocation rows,
//! and provides the project lookups every scoped handler starts with.
//! Out-of-scope projects are reported as NotFound, never Forbidden, so the
//! existence of inaccessible records is not confirmed.

use sitetrack_core::error::CoreError;
use sitetrack_core::roles::Role;
use sitetrack_core::scope::AccessScope;
use sitetrack_core::types::DbId;
use sitetrack_db::models::project::Project;
use sitetrack_db::repositories::{AllocationRepo, ProjectRepo};
use sqlx::PgPool;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;

/// Resolve the caller's access scope. Admins skip the allocation query.
pub async fn resolve_scope(pool: &PgPool, user: &AuthUser) -> AppResult<AccessScope> {
    if user.role == Role::Admin {
        return Ok(AccessScope::for_user(Role::Admin, []));
    }
    let allocated = AllocationRepo::project_ids_for_user(pool, user.user_id).await?;
    Ok(AccessScope::for_user(user.role, allocated))
}

/// Fetch a project the caller may see, or NotFound.
pub async fn require_project(
    pool: &PgPool,
    id: DbId,
    scope: &AccessScope,
) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, id, scope)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Project", id }.into())
}

/// Fetch a visible project and additionally require it to be mutable
/// (not finalized). Finalized projects are read-only to every core
/// mutation.
pub async fn require_mutable_project(
    pool: &PgPool,
    id: DbId,
    scope: &AccessScope,
) -> AppResult<Project> {
    let project = require_project(pool, id, scope).await?;
    if project.is_finalized() {
        return Err(CoreError::Validation(
            "This project is finalized and read-only.".to_string(),
        )
        .into());
    }
    Ok(project)
}
