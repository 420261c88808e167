//! Handlers for the `/projects` resource: CRUD, the progress overview, the
//! daily timeline, milestones and the report view.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sitetrack_core::error::CoreError;
use sitetrack_core::milestones::{milestones, DEFAULT_THRESHOLDS};
use sitetrack_core::progress::{progress_view, real_progress, ProgressView, TaskStats};
use sitetrack_core::timeline::{build_timeline, SnapshotPoint, TimelineProject, TimelineSeries};
use sitetrack_core::types::{Date, DbId};
use sitetrack_db::models::category::CategoryWithProgress;
use sitetrack_db::models::inspection::Inspection;
use sitetrack_db::models::issue::{Issue, IssueStatusCounts};
use sitetrack_db::models::project::{CreateProject, Project, UpdateProject};
use sitetrack_db::repositories::{
    AllocationRepo, CategoryRepo, InspectionRepo, IssueRepo, ProjectRepo, SnapshotRepo, TaskRepo,
};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::scope::{require_project, resolve_scope};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

/// One project in the list view, with its progress summary.
#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub progress: ProgressView,
}

/// Detail view: the project, its category tree and issue counts.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub progress: ProgressView,
    pub categories: Vec<CategoryWithProgress>,
    pub issue_counts: IssueStatusCounts,
}

/// Overview payload: every visible project's summary plus the selected
/// project's reconstructed timeline and milestones.
#[derive(Debug, Serialize)]
pub struct OverviewPayload {
    pub projects: Vec<ProjectSummary>,
    pub selected_project_id: Option<DbId>,
    pub series: TimelineSeries,
    pub milestones: HashMap<i32, Option<i64>>,
}

/// Report view: progress, issue groups, inspection summary.
#[derive(Debug, Serialize)]
pub struct ProjectReport {
    #[serde(flatten)]
    pub project: Project,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub progress: ProgressView,
    pub open_issues: Vec<Issue>,
    pub in_progress_issues: Vec<Issue>,
    pub resolved_issues: Vec<Issue>,
    pub inspections_total: i64,
    pub recent_inspections: Vec<Inspection>,
    pub generated_at: sitetrack_core::types::Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct OverviewParams {
    /// Selected project for the timeline panel; defaults to the first
    /// visible project.
    pub project: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct TimelineParams {
    /// Optional end date override for the series.
    pub end: Option<Date>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Compute progress views for a set of projects with one aggregated query.
async fn progress_map(
    state: &AppState,
    projects: &[Project],
    today: Date,
) -> AppResult<HashMap<DbId, ProgressView>> {
    let ids: Vec<DbId> = projects.iter().map(|p| p.id).collect();
    let stats = TaskRepo::stats_by_projects(&state.pool, &ids).await?;
    let stats_map: HashMap<DbId, TaskStats> =
        stats.iter().map(|s| (s.project_id, s.as_core())).collect();

    Ok(projects
        .iter()
        .map(|p| {
            let stats = stats_map.get(&p.id).copied().unwrap_or_default();
            let view = progress_view(&stats, p.start_date, p.expected_end_date, today);
            (p.id, view)
        })
        .collect())
}

/// The live real progress for a single project.
async fn live_real_progress(state: &AppState, project_id: DbId) -> AppResult<f64> {
    let stats = TaskRepo::stats_by_projects(&state.pool, &[project_id])
        .await?
        .into_iter()
        .next()
        .map(|s| s.as_core())
        .unwrap_or_default();
    Ok(real_progress(&stats))
}

// ---------------------------------------------------------------------------
// List & overview
// ---------------------------------------------------------------------------

/// GET /projects
///
/// Visible projects with their progress summaries.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let projects = ProjectRepo::list(&state.pool, &scope).await?;
    let today = Utc::now().date_naive();
    let mut progress = progress_map(&state, &projects, today).await?;

    let summaries: Vec<ProjectSummary> = projects
        .into_iter()
        .map(|p| {
            let view = progress.remove(&p.id).unwrap_or_else(|| {
                progress_view(&TaskStats::default(), p.start_date, p.expected_end_date, today)
            });
            ProjectSummary {
                project: p,
                progress: view,
            }
        })
        .collect();

    Ok(Json(DataResponse { data: summaries }))
}

/// GET /projects/overview?project={id}
///
/// Progress summaries for every visible project, plus the timeline and
/// milestones of the selected one.
pub async fn overview(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<OverviewParams>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let projects = ProjectRepo::list(&state.pool, &scope).await?;
    let today = Utc::now().date_naive();
    let mut progress = progress_map(&state, &projects, today).await?;

    // Selected project: the requested one when visible, else the first.
    let selected = params
        .project
        .and_then(|id| projects.iter().find(|p| p.id == id))
        .or_else(|| projects.first());

    let (series, milestone_map, selected_id) = match selected {
        Some(project) => {
            let snapshots = SnapshotRepo::list_for_project(&state.pool, project.id).await?;
            let points: Vec<SnapshotPoint> = snapshots.iter().map(|s| s.as_point()).collect();
            let live = progress.get(&project.id).map_or(0.0, |v| v.real);
            let series = build_timeline(
                TimelineProject {
                    start_date: project.start_date,
                    expected_end_date: project.expected_end_date,
                },
                &points,
                live,
                today,
                None,
            );
            let milestone_map = milestones(project.start_date, &points, DEFAULT_THRESHOLDS);
            (series, milestone_map.into_iter().collect(), Some(project.id))
        }
        None => (TimelineSeries::default(), HashMap::new(), None),
    };

    let summaries: Vec<ProjectSummary> = projects
        .into_iter()
        .map(|p| {
            let view = progress.remove(&p.id).unwrap_or_else(|| {
                progress_view(&TaskStats::default(), p.start_date, p.expected_end_date, today)
            });
            ProjectSummary {
                project: p,
                progress: view,
            }
        })
        .collect();

    Ok(Json(DataResponse {
        data: OverviewPayload {
            projects: summaries,
            selected_project_id: selected_id,
            series,
            milestones: milestone_map,
        },
    }))
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /projects
///
/// Create a project. Admin only.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CreateProject>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    let project = ProjectRepo::create(&state.pool, &body).await?;
    tracing::info!(project_id = project.id, "Project created");
    Ok(Json(DataResponse { data: project }))
}

/// GET /projects/{id}
///
/// Project detail: categories with progress, issue counts.
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let project = require_project(&state.pool, id, &scope).await?;

    let today = Utc::now().date_naive();
    let stats = TaskRepo::stats_by_projects(&state.pool, &[project.id])
        .await?
        .into_iter()
        .next()
        .map(|s| s.as_core())
        .unwrap_or_default();
    let progress = progress_view(&stats, project.start_date, project.expected_end_date, today);

    let categories = CategoryRepo::list_with_progress(&state.pool, project.id).await?;
    let issue_counts = IssueRepo::counts_for_project(&state.pool, project.id).await?;

    Ok(Json(DataResponse {
        data: ProjectDetail {
            project,
            progress,
            categories,
            issue_counts,
        },
    }))
}

/// PUT /projects/{id}
///
/// Update project metadata. Admin only.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateProject>,
) -> AppResult<impl IntoResponse> {
    body.validate()?;
    if let Some(status) = &body.status {
        if !matches!(status.as_str(), "active" | "finalized") {
            return Err(CoreError::Validation(format!("Unknown project status '{status}'")).into());
        }
    }
    let scope = resolve_scope(&state.pool, &admin).await?;
    require_project(&state.pool, id, &scope).await?;

    let project = ProjectRepo::update(&state.pool, id, &body)
        .await?
        .ok_or(CoreError::NotFound { entity: "Project", id })?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /projects/{id}/finalize
///
/// Mark a project finalized (read-only from then on). A project with no
/// planned end date gets stamped with today. Admin only.
pub async fn finalize(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &admin).await?;
    require_project(&state.pool, id, &scope).await?;

    let today = Utc::now().date_naive();
    let project = ProjectRepo::finalize(&state.pool, id, today)
        .await?
        .ok_or(CoreError::NotFound { entity: "Project", id })?;
    tracing::info!(project_id = project.id, "Project finalized");
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /projects/{id}
///
/// Soft-delete a project and drop its allocations. Issues stay in the
/// backlog. Admin only.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &admin).await?;
    require_project(&state.pool, id, &scope).await?;

    AllocationRepo::delete_for_project(&state.pool, id).await?;
    let deleted = ProjectRepo::soft_delete(&state.pool, id).await?;
    if !deleted {
        return Err(CoreError::NotFound { entity: "Project", id }.into());
    }
    tracing::info!(project_id = id, "Project soft-deleted");
    Ok(Json(DataResponse { data: serde_json::json!({ "deleted": true }) }))
}

// ---------------------------------------------------------------------------
// Timeline & report
// ---------------------------------------------------------------------------

/// GET /projects/{id}/timeline?end={date}
///
/// The gap-filled daily real/expected series plus milestones.
pub async fn timeline(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
    Query(params): Query<TimelineParams>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let project = require_project(&state.pool, id, &scope).await?;

    let snapshots = SnapshotRepo::list_for_project(&state.pool, project.id).await?;
    let points: Vec<SnapshotPoint> = snapshots.iter().map(|s| s.as_point()).collect();
    let today = Utc::now().date_naive();
    let live = live_real_progress(&state, project.id).await?;

    let series = build_timeline(
        TimelineProject {
            start_date: project.start_date,
            expected_end_date: project.expected_end_date,
        },
        &points,
        live,
        today,
        params.end,
    );
    let milestone_map: HashMap<i32, Option<i64>> =
        milestones(project.start_date, &points, DEFAULT_THRESHOLDS)
            .into_iter()
            .collect();

    Ok(Json(DataResponse {
        data: serde_json::json!({
            "series": series,
            "milestones": milestone_map,
        }),
    }))
}

/// GET /projects/{id}/report
///
/// Progress-vs-schedule report with issue groups and inspection summary.
pub async fn report(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scope = resolve_scope(&state.pool, &user).await?;
    let project = require_project(&state.pool, id, &scope).await?;

    let today = Utc::now().date_naive();
    let stats = TaskRepo::stats_by_projects(&state.pool, &[project.id])
        .await?
        .into_iter()
        .next();
    let core_stats = stats.as_ref().map(|s| s.as_core()).unwrap_or_default();
    let progress = progress_view(&core_stats, project.start_date, project.expected_end_date, today);

    // Issues grouped by status, restricted to this project.
    let all_issues = IssueRepo::list_for_project(&state.pool, project.id).await?;
    let mut open = Vec::new();
    let mut in_progress = Vec::new();
    let mut resolved = Vec::new();
    for issue in all_issues {
        match issue.status.as_str() {
            "in_progress" => in_progress.push(issue),
            "resolved" => resolved.push(issue),
            _ => open.push(issue),
        }
    }

    let inspections = InspectionRepo::list_by_project(&state.pool, project.id).await?;
    let inspections_total = inspections.len() as i64;
    let recent_inspections: Vec<Inspection> = inspections.into_iter().take(5).collect();

    Ok(Json(DataResponse {
        data: ProjectReport {
            total_tasks: core_stats.total,
            completed_tasks: core_stats.completed,
            project,
            progress,
            open_issues: open,
            in_progress_issues: in_progress,
            resolved_issues: resolved,
            inspections_total,
            recent_inspections,
            generated_at: Utc::now(),
        },
    }))
}
