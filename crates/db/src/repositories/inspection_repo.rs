//! Repository for the `inspections`, `inspection_photos` and
//! `task_change_records` tables.
//!
//! Write methods are executor-generic: the inspection recording engine
//! runs them inside one transaction together with task transitions and the
//! snapshot upsert.

use sitetrack_core::scope::AccessScope;
use sitetrack_core::types::{Date, DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::inspection::{Inspection, InspectionPhoto, TaskChangeRecord};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, author_id, inspected_at, inspection_date, \
                       latitude, longitude, observations, created_at, updated_at";

/// Provides data access for inspections and their satellite rows.
pub struct InspectionRepo;

impl InspectionRepo {
    /// Insert the inspection row itself.
    ///
    /// A second inspection by the same author on the same project and day
    /// violates `uq_inspections_project_author_date` and surfaces as a
    /// conflict.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert<'e, E>(
        executor: E,
        project_id: DbId,
        author_id: DbId,
        inspected_at: Timestamp,
        inspection_date: Date,
        coordinates: Option<(f64, f64)>,
        observations: &str,
    ) -> Result<Inspection, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO inspections
                (project_id, author_id, inspected_at, inspection_date,
                 latitude, longitude, observations)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Inspection>(&query)
            .bind(project_id)
            .bind(author_id)
            .bind(inspected_at)
            .bind(inspection_date)
            .bind(coordinates.map(|(lat, _)| lat))
            .bind(coordinates.map(|(_, lng)| lng))
            .bind(observations)
            .fetch_one(executor)
            .await
    }

    /// Attach one ordered photo evidence record.
    pub async fn add_photo<'e, E>(
        executor: E,
        inspection_id: DbId,
        position: i32,
        storage_ref: &str,
        caption: &str,
    ) -> Result<InspectionPhoto, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, InspectionPhoto>(
            "INSERT INTO inspection_photos (inspection_id, position, storage_ref, caption)
             VALUES ($1, $2, $3, $4)
             RETURNING id, inspection_id, storage_ref, caption, position, created_at",
        )
        .bind(inspection_id)
        .bind(position)
        .bind(storage_ref)
        .bind(caption)
        .fetch_one(executor)
        .await
    }

    /// Journal one task's percentage change for this inspection.
    pub async fn add_change_record<'e, E>(
        executor: E,
        inspection_id: DbId,
        task_id: DbId,
        percent_before: i32,
        percent_after: i32,
    ) -> Result<TaskChangeRecord, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TaskChangeRecord>(
            "INSERT INTO task_change_records
                (inspection_id, task_id, percent_before, percent_after)
             VALUES ($1, $2, $3, $4)
             RETURNING id, inspection_id, task_id, percent_before, percent_after, created_at",
        )
        .bind(inspection_id)
        .bind(task_id)
        .bind(percent_before)
        .bind(percent_after)
        .fetch_one(executor)
        .await
    }

    /// Find a visible inspection by ID (scope filter on its project).
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        scope: &AccessScope,
    ) -> Result<Option<Inspection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inspections
             WHERE id = $1 AND ($2::bigint[] IS NULL OR project_id = ANY($2))"
        );
        sqlx::query_as::<_, Inspection>(&query)
            .bind(id)
            .bind(scope.id_filter())
            .fetch_optional(pool)
            .await
    }

    /// List a project's inspections, newest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Inspection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM inspections
             WHERE project_id = $1
             ORDER BY inspection_date DESC, id DESC"
        );
        sqlx::query_as::<_, Inspection>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// List an inspection's photos in display order.
    pub async fn photos(
        pool: &PgPool,
        inspection_id: DbId,
    ) -> Result<Vec<InspectionPhoto>, sqlx::Error> {
        sqlx::query_as::<_, InspectionPhoto>(
            "SELECT id, inspection_id, storage_ref, caption, position, created_at
             FROM inspection_photos WHERE inspection_id = $1 ORDER BY position, id",
        )
        .bind(inspection_id)
        .fetch_all(pool)
        .await
    }

    /// List an inspection's task change journal in task order.
    pub async fn change_records(
        pool: &PgPool,
        inspection_id: DbId,
    ) -> Result<Vec<TaskChangeRecord>, sqlx::Error> {
        sqlx::query_as::<_, TaskChangeRecord>(
            "SELECT r.id, r.inspection_id, r.task_id, r.percent_before, r.percent_after,
                    r.created_at
             FROM task_change_records r
             JOIN tasks t ON t.id = r.task_id
             WHERE r.inspection_id = $1
             ORDER BY t.category_id, t.position, t.id",
        )
        .bind(inspection_id)
        .fetch_all(pool)
        .await
    }
}
