//! Handlers for tasks.
//!
//! The percentage endpoint is the single mutation path for task progress:
//! every write runs the state machine, so status and completion date never
//! drift from the raw percentage, and every change value triggers a
//! snapshot refresh for the owning project.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sitetrack_core::error::CoreError;
use sitetrack_core::task_state::{
    ensure_may_edit_percent, plan_transition, validate_percent, TaskStatus,
};
use sitetrack_core::types::DbId;
use sitetrack_db::models::task::{CreateTask, UpdateTask};
use sitetrack_db::repositories::{CategoryRepo, IssueRepo, TaskRepo};
use validator::Validate;

use crate::engine::snapshot;
use crate::error::AppResult;
use crate::middleware::rbac::{RequireAuth, RequireLevel2};
use crate::response::DataResponse;
use crate::scope::{require_mutable_project, resolve_scope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdatePercentRequest {
    pub percent: i64,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// POST /categories/{category_id}/tasks
///
/// Create a task. The initial percentage flows through the state machine,
/// and task creation counts as a percentage change for snapshot purposes.
pub async fn create(
    State(state): State<AppState>,
    RequireLevel2(user): RequireLevel2,
    Path(category_id): Path<DbId>,
    Json(body): Json<CreateTask>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let scope = resolve_scope(&state.pool, &user).await?;
    let category = CategoryRepo::find_by_id(&state.pool, category_id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Category", id: category_id })?;
    let project = require_mutable_project(&state.pool, category.project_id, &scope).await?;

    let today = Utc::now().date_naive();
    let percent = validate_percent(body.percent.unwrap_or(0), &body.name)?;
    // A brand-new task has no issues, so completion cannot be blocked here.
    let transition =
        plan_transition(TaskStatus::NotStarted, None, percent, 0, today, &body.name)?;

    let task = TaskRepo::create(&state.pool, category.id, &body, &transition).await?;
    snapshot::refresh(&state.pool, &project, today).await?;

    tracing::info!(task_id = task.id, project_id = project.id, "Task created");
    Ok(Json(DataResponse { data: task }))
}

/// PUT /tasks/{id}
///
/// Update task metadata. Renames and date changes do not touch progress,
/// so no snapshot is written here.
pub async fn update(
    State(state): State<AppState>,
    RequireLevel2(user): RequireLevel2,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateTask>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let scope = resolve_scope(&state.pool, &user).await?;
    let task = TaskRepo::find_with_project(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Task", id })?;
    require_mutable_project(&state.pool, task.project_id, &scope).await?;

    let updated = TaskRepo::update(&state.pool, id, &body)
        .await?
        .ok_or(CoreError::NotFound { entity: "Task", id })?;
    Ok(Json(DataResponse { data: updated }))
}

/// PUT /tasks/{id}/percent
///
/// Update a task's completion percentage. All roles may record progress,
/// but level1 cannot change an already-completed task to a different value.
pub async fn update_percent(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    Json(body): Json<UpdatePercentRequest>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let task = TaskRepo::find_with_project(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Task", id })?;
    if !scope.is_visible(task.project_id) {
        return Err(CoreError::NotFound { entity: "Task", id }.into());
    }
    let project = require_mutable_project(&state.pool, task.project_id, &scope).await?;

    let percent = validate_percent(body.percent, &task.name)?;
    let status = TaskStatus::parse(&task.status).ok_or_else(|| {
        CoreError::Internal(format!("task {} has unknown status '{}'", task.id, task.status))
    })?;
    ensure_may_edit_percent(user.role, status, task.percent, percent, &task.name)?;

    if percent == task.percent {
        // No-op write: nothing changes, no snapshot is triggered.
        let unchanged = TaskRepo::find_with_project(&state.pool, id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Task", id })?;
        return Ok(Json(DataResponse { data: unchanged }));
    }

    let today = Utc::now().date_naive();
    let open_issues = IssueRepo::count_open_for_task(&state.pool, task.id).await?;
    let transition =
        plan_transition(status, task.actual_end, percent, open_issues, today, &task.name)?;

    TaskRepo::apply_transition(&state.pool, task.id, &transition)
        .await?
        .ok_or(CoreError::NotFound { entity: "Task", id })?;
    snapshot::refresh(&state.pool, &project, today).await?;

    let updated = TaskRepo::find_with_project(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Task", id })?;

    tracing::info!(
        task_id = task.id,
        project_id = project.id,
        percent_before = task.percent,
        percent_after = percent,
        "Task percentage updated"
    );
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /tasks/{id}
///
/// Delete a task. Dependent issues or journal rows make this a conflict.
pub async fn delete(
    State(state): State<AppState>,
    RequireLevel2(user): RequireLevel2,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let task = TaskRepo::find_with_project(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Task", id })?;
    let project = require_mutable_project(&state.pool, task.project_id, &scope).await?;

    let deleted = TaskRepo::delete(&state.pool, id).await?;
    if deleted {
        // Removing a task changes the project's aggregate progress.
        snapshot::refresh(&state.pool, &project, Utc::now().date_naive()).await?;
    }
    Ok(Json(DataResponse {
        data: DeletedResponse { deleted },
    }))
}
