//! Handlers for inspections.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use sitetrack_core::error::CoreError;
use sitetrack_core::types::DbId;
use sitetrack_db::models::inspection::{Inspection, InspectionPhoto, TaskChangeRecord};
use sitetrack_db::repositories::InspectionRepo;

use crate::engine::inspection::{record, RecordInspection};
use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::{DataResponse, DataWithWarnings};
use crate::scope::{require_mutable_project, require_project, resolve_scope};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct InspectionResult {
    #[serde(flatten)]
    pub inspection: Inspection,
    pub changes: Vec<TaskChangeRecord>,
}

#[derive(Debug, Serialize)]
pub struct InspectionDetail {
    #[serde(flatten)]
    pub inspection: Inspection,
    pub photos: Vec<InspectionPhoto>,
    pub changes: Vec<TaskChangeRecord>,
}

/// POST /projects/{project_id}/inspections
///
/// Record an inspection with its batched task percentage edits, photo
/// evidence and best-effort geolocation. All task edits commit atomically
/// or not at all.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(project_id): Path<DbId>,
    Json(body): Json<RecordInspection>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let project = require_mutable_project(&state.pool, project_id, &scope).await?;

    let recorded = record(&state.pool, &project, &user, body, Utc::now()).await?;

    Ok(Json(DataWithWarnings {
        data: InspectionResult {
            inspection: recorded.inspection,
            changes: recorded.changes,
        },
        warnings: recorded.warnings,
    }))
}

/// GET /projects/{project_id}/inspections
///
/// A project's inspections, newest first.
pub async fn list_by_project(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let project = require_project(&state.pool, project_id, &scope).await?;

    let inspections = InspectionRepo::list_by_project(&state.pool, project.id).await?;
    Ok(Json(DataResponse { data: inspections }))
}

/// GET /inspections/{id}
///
/// Inspection detail with photos and the task change journal.
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let inspection = InspectionRepo::find_by_id(&state.pool, id, &scope)
        .await?
        .ok_or(CoreError::NotFound { entity: "Inspection", id })?;

    let photos = InspectionRepo::photos(&state.pool, inspection.id).await?;
    let changes = InspectionRepo::change_records(&state.pool, inspection.id).await?;

    Ok(Json(DataResponse {
        data: InspectionDetail {
            inspection,
            photos,
            changes,
        },
    }))
}
