//! Transactional inspection recording.
//!
//! One atomic unit: the inspection row, every task percentage transition,
//! the per-task change journal, one snapshot refresh for the project, and
//! the photo evidence rows. A validation, permission or invariant failure
//! on any task edit aborts the whole transaction -- zero rows committed.

use std::collections::HashMap;

use serde::Deserialize;
use sitetrack_core::attachments::validate_image;
use sitetrack_core::error::CoreError;
use sitetrack_core::geolocation::parse_coordinates;
use sitetrack_core::task_state::{
    ensure_may_edit_percent, plan_transition, validate_percent, TaskStatus,
};
use sitetrack_core::types::{DbId, Timestamp};
use sitetrack_db::models::inspection::{Inspection, InspectionPhotoInput, TaskChangeRecord};
use sitetrack_db::models::project::Project;
use sitetrack_db::repositories::{InspectionRepo, IssueRepo, TaskRepo};
use sqlx::PgPool;

use crate::engine::snapshot;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;

/// One requested task percentage edit.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskEdit {
    pub task_id: DbId,
    /// Raw value; range-validated against 0..=100 before any write.
    pub percent: i64,
}

/// A full inspection submission.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordInspection {
    #[serde(default)]
    pub observations: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[serde(default)]
    pub task_edits: Vec<TaskEdit>,
    #[serde(default)]
    pub photos: Vec<InspectionPhotoInput>,
}

/// The committed result plus non-fatal warnings.
#[derive(Debug)]
pub struct RecordedInspection {
    pub inspection: Inspection,
    pub changes: Vec<TaskChangeRecord>,
    pub warnings: Vec<String>,
}

/// Record an inspection against a visible, mutable project.
pub async fn record(
    pool: &PgPool,
    project: &Project,
    author: &AuthUser,
    input: RecordInspection,
    now: Timestamp,
) -> AppResult<RecordedInspection> {
    // Photo metadata is validated before any write.
    for photo in &input.photos {
        validate_image(
            photo.content_type.as_deref(),
            &photo.storage_ref,
            photo.size_bytes.unwrap_or(0),
        )?;
    }

    // Geolocation is best-effort: parse failures warn, never block.
    let parsed = parse_coordinates(input.latitude.as_deref(), input.longitude.as_deref());
    let mut warnings = Vec::new();
    if let Some(warning) = parsed.warning {
        // Only warn when the submitter attempted to send coordinates.
        if input.latitude.is_some() || input.longitude.is_some() {
            warnings.push(warning);
        }
    }

    let today = now.date_naive();
    let mut tx = pool.begin().await?;

    let inspection = InspectionRepo::insert(
        &mut *tx,
        project.id,
        author.user_id,
        now,
        today,
        parsed.coordinates,
        input.observations.trim(),
    )
    .await?;

    // Apply edits in (category, position, id) order so validation failures
    // are deterministic regardless of submission order.
    let mut requested: HashMap<DbId, i64> =
        input.task_edits.iter().map(|e| (e.task_id, e.percent)).collect();
    let tasks = TaskRepo::list_by_project(&mut *tx, project.id).await?;

    let mut changes = Vec::new();
    for task in &tasks {
        let Some(raw_percent) = requested.remove(&task.id) else {
            continue;
        };

        let percent = validate_percent(raw_percent, &task.name)?;
        let status = TaskStatus::parse(&task.status).ok_or_else(|| {
            CoreError::Internal(format!("task {} has unknown status '{}'", task.id, task.status))
        })?;
        ensure_may_edit_percent(author.role, status, task.percent, percent, &task.name)?;

        if percent == task.percent {
            continue;
        }

        let open_issues = IssueRepo::count_open_for_task(&mut *tx, task.id).await?;
        let transition =
            plan_transition(status, task.actual_end, percent, open_issues, today, &task.name)?;

        TaskRepo::apply_transition(&mut *tx, task.id, &transition)
            .await?
            .ok_or(CoreError::NotFound { entity: "Task", id: task.id })?;

        let record =
            InspectionRepo::add_change_record(&mut *tx, inspection.id, task.id, task.percent, percent)
                .await?;
        changes.push(record);
    }

    // Any edit targeting a task outside this project is a miss, reported
    // without confirming whether the id exists elsewhere.
    if let Some(&unknown_id) = requested.keys().next() {
        return Err(CoreError::NotFound { entity: "Task", id: unknown_id }.into());
    }

    // One snapshot write per affected project, not one per task.
    if !changes.is_empty() {
        snapshot::refresh_on(&mut *tx, project, today).await?;
    }

    for (index, photo) in input.photos.iter().enumerate() {
        InspectionRepo::add_photo(
            &mut *tx,
            inspection.id,
            index as i32,
            &photo.storage_ref,
            photo.caption.as_deref().unwrap_or(""),
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        inspection_id = inspection.id,
        project_id = project.id,
        changed_tasks = changes.len(),
        "Inspection recorded"
    );

    Ok(RecordedInspection {
        inspection,
        changes,
        warnings,
    })
}
