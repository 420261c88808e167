//! Handlers for issues ("pendencias").
//!
//! Issue status changes trigger a snapshot refresh for the owning project,
//! since resolving an issue can unblock task completion.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sitetrack_core::error::CoreError;
use sitetrack_core::issue_state::{plan_status_change, IssuePriority, IssueStatus};
use sitetrack_core::roles::may_assign_responsible;
use sitetrack_core::types::DbId;
use sitetrack_db::models::issue::{CreateIssue, Issue, IssueFilter, IssueSolution, IssueStatusCounts};
use sitetrack_db::repositories::{IssueRepo, TaskRepo, UserRepo};
use validator::Validate;

use crate::engine::snapshot;
use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::scope::{require_mutable_project, resolve_scope};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / view types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub solution_note: Option<String>,
    pub resolution_photo_ref: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IssueList {
    pub items: Vec<Issue>,
    pub counts: IssueStatusCounts,
}

#[derive(Debug, Serialize)]
pub struct IssueDetail {
    #[serde(flatten)]
    pub issue: Issue,
    pub solutions: Vec<IssueSolution>,
}

// ---------------------------------------------------------------------------
// List & detail
// ---------------------------------------------------------------------------

/// GET /issues?status={s}&q={text}
///
/// Visible issues with per-status counts over the same filtered set.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(filter): Query<IssueFilter>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = &filter.status {
        if IssueStatus::parse(status).is_none() {
            return Err(CoreError::Validation(format!("Unknown issue status '{status}'")).into());
        }
    }

    let scope = resolve_scope(&state.pool, &user).await?;
    let items = IssueRepo::list(&state.pool, &scope, &filter).await?;
    let counts = IssueRepo::counts(&state.pool, &scope, filter.q.as_deref()).await?;

    Ok(Json(DataResponse {
        data: IssueList { items, counts },
    }))
}

/// GET /issues/{id}
///
/// Issue detail with its solution journal.
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let issue = IssueRepo::find_by_id(&state.pool, id, &scope)
        .await?
        .ok_or(CoreError::NotFound { entity: "Issue", id })?;
    let solutions = IssueRepo::list_solutions(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: IssueDetail { issue, solutions },
    }))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /projects/{project_id}/issues
///
/// Open an issue against one of the project's tasks. Opening an issue is a
/// status change (to open), so the project snapshot is refreshed.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(project_id): Path<DbId>,
    Json(body): Json<CreateIssue>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    if let Some(priority) = &body.priority {
        if IssuePriority::parse(priority).is_none() {
            return Err(CoreError::Validation(format!("Unknown priority '{priority}'")).into());
        }
    }

    let scope = resolve_scope(&state.pool, &user).await?;
    let project = require_mutable_project(&state.pool, project_id, &scope).await?;

    // The task must belong to this project; a miss is NotFound either way.
    let task = TaskRepo::find_with_project(&state.pool, body.task_id)
        .await?
        .filter(|t| t.project_id == project.id)
        .ok_or(CoreError::NotFound { entity: "Task", id: body.task_id })?;

    // Responsible assignment follows the role-administration rules.
    if let Some(responsible_id) = body.responsible_id {
        let candidate = UserRepo::find_by_id(&state.pool, responsible_id)
            .await?
            .ok_or(CoreError::NotFound { entity: "User", id: responsible_id })?;
        let candidate_role = sitetrack_core::roles::Role::parse(&candidate.role)
            .ok_or_else(|| CoreError::Internal(format!("user {} has unknown role", candidate.id)))?;
        if !may_assign_responsible(user.role, candidate_role, responsible_id == user.user_id) {
            return Err(CoreError::Forbidden(format!(
                "You may not assign issues to '{}'.",
                candidate.username
            ))
            .into());
        }
    }

    let issue = IssueRepo::create(&state.pool, project.id, Some(task.category_id), &body).await?;
    snapshot::refresh(&state.pool, &project, Utc::now().date_naive()).await?;

    tracing::info!(issue_id = issue.id, project_id = project.id, "Issue opened");
    Ok(Json(DataResponse { data: issue }))
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// POST /issues/{id}/status
///
/// Move an issue to `in_progress` or `resolved`. Resolving requires a
/// solution note, stamps the closing timestamp and journals the note.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let issue = IssueRepo::find_by_id(&state.pool, id, &scope)
        .await?
        .ok_or(CoreError::NotFound { entity: "Issue", id })?;
    let project = require_mutable_project(&state.pool, issue.project_id, &scope).await?;

    let new_status = IssueStatus::parse(&body.status)
        .ok_or_else(|| CoreError::Validation("Invalid status for update.".to_string()))?;

    // Re-marking in_progress is an allowed no-op.
    if new_status == IssueStatus::InProgress && issue.status == "in_progress" {
        return Ok(Json(DataResponse { data: issue }));
    }

    let transition = plan_status_change(new_status, body.solution_note.as_deref(), Utc::now())?;
    let updated = IssueRepo::apply_transition(
        &state.pool,
        id,
        &transition,
        user.user_id,
        body.resolution_photo_ref.as_deref(),
    )
    .await?
    .ok_or(CoreError::NotFound { entity: "Issue", id })?;

    snapshot::refresh(&state.pool, &project, Utc::now().date_naive()).await?;

    tracing::info!(issue_id = id, status = %body.status, "Issue status updated");
    Ok(Json(DataResponse { data: updated }))
}
