//! Repository for the `progress_snapshots` table.
//!
//! One row per (project, date), written exclusively through the idempotent
//! upsert. The unique constraint resolves concurrent writers natively; no
//! application-level locking.

use sitetrack_core::types::{Date, DbId};
use sqlx::PgExecutor;

use crate::models::snapshot::ProgressSnapshot;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, project_id, snapshot_date, real_pct, expected_pct, created_at, updated_at";

/// Provides data access for progress snapshots.
pub struct SnapshotRepo;

impl SnapshotRepo {
    /// Insert or overwrite the snapshot for (project, date).
    ///
    /// Values must already be quantized to one decimal by the caller.
    /// Executor-generic so the inspection transaction can participate.
    pub async fn upsert<'e, E>(
        executor: E,
        project_id: DbId,
        snapshot_date: Date,
        real_pct: f64,
        expected_pct: Option<f64>,
    ) -> Result<ProgressSnapshot, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO progress_snapshots (project_id, snapshot_date, real_pct, expected_pct)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (project_id, snapshot_date)
             DO UPDATE SET real_pct = EXCLUDED.real_pct, expected_pct = EXCLUDED.expected_pct
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProgressSnapshot>(&query)
            .bind(project_id)
            .bind(snapshot_date)
            .bind(real_pct)
            .bind(expected_pct)
            .fetch_one(executor)
            .await
    }

    /// List a project's snapshots ordered by date ascending.
    pub async fn list_for_project<'e, E>(
        executor: E,
        project_id: DbId,
    ) -> Result<Vec<ProgressSnapshot>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM progress_snapshots
             WHERE project_id = $1 ORDER BY snapshot_date"
        );
        sqlx::query_as::<_, ProgressSnapshot>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await
    }
}
