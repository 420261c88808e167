//! Snapshot refresh: compute a project's real/expected progress and upsert
//! the daily snapshot row.
//!
//! Mutation paths call this explicitly after a task percentage or issue
//! status change -- the dependency is visible in the call site rather than
//! hidden behind a save hook. Unrelated field edits (renames, description
//! changes) do not refresh.

use sitetrack_core::progress::{expected_progress, quantize_pct, real_progress, TaskStats};
use sitetrack_core::types::Date;
use sitetrack_db::models::project::Project;
use sitetrack_db::models::snapshot::ProgressSnapshot;
use sitetrack_db::repositories::{SnapshotRepo, TaskRepo};
use sqlx::{PgConnection, PgPool};

use crate::error::{AppError, AppResult};

/// Refresh the snapshot for `project` at `today` using a pooled connection.
pub async fn refresh(pool: &PgPool, project: &Project, today: Date) -> AppResult<ProgressSnapshot> {
    let mut conn = pool.acquire().await?;
    refresh_on(&mut conn, project, today).await
}

/// Refresh the snapshot on an existing connection, so callers holding a
/// transaction can make the write part of their atomic unit.
///
/// The (project, date) key is idempotent: recomputing with unchanged task
/// state overwrites the row with identical values. A unique-constraint race
/// between two concurrent writers is retried once, then surfaced as a
/// conflict.
pub async fn refresh_on(
    conn: &mut PgConnection,
    project: &Project,
    today: Date,
) -> AppResult<ProgressSnapshot> {
    let stats = TaskRepo::stats_by_projects(&mut *conn, &[project.id])
        .await?
        .into_iter()
        .next()
        .map(|s| s.as_core())
        .unwrap_or(TaskStats::default());

    let real = real_progress(&stats);
    let expected = expected_progress(project.start_date, project.expected_end_date, today)
        .map(quantize_pct);

    match SnapshotRepo::upsert(&mut *conn, project.id, today, real, expected).await {
        Ok(snapshot) => Ok(snapshot),
        Err(err) if is_unique_violation(&err) => {
            tracing::warn!(
                project_id = project.id,
                "Snapshot upsert hit a unique-constraint race, retrying once"
            );
            SnapshotRepo::upsert(&mut *conn, project.id, today, real, expected)
                .await
                .map_err(AppError::Database)
        }
        Err(err) => Err(AppError::Database(err)),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}
