//! Repository for the `projects` table.
//!
//! All reads are scope-filtered: a restricted scope becomes an explicit id
//! list bound as `bigint[]`, so out-of-scope rows simply do not match --
//! callers then report the miss as NotFound.

use sitetrack_core::scope::AccessScope;
use sitetrack_core::types::{Date, DbId};
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, client, address, start_date, expected_end_date, status, \
                       deleted_at, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, client, address, start_date, expected_end_date)
             VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.client)
            .bind(&input.address)
            .bind(input.start_date)
            .bind(input.expected_end_date)
            .fetch_one(pool)
            .await
    }

    /// List the projects visible to the caller, ordered by name.
    /// Excludes soft-deleted rows.
    pub async fn list(pool: &PgPool, scope: &AccessScope) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE deleted_at IS NULL
               AND ($1::bigint[] IS NULL OR id = ANY($1))
             ORDER BY name"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(scope.id_filter())
            .fetch_all(pool)
            .await
    }

    /// Find a visible project by ID. Excludes soft-deleted rows and rows
    /// outside the caller's scope.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        scope: &AccessScope,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE id = $1 AND deleted_at IS NULL
               AND ($2::bigint[] IS NULL OR id = ANY($2))"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(scope.id_filter())
            .fetch_optional(pool)
            .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                client = COALESCE($3, client),
                address = COALESCE($4, address),
                start_date = COALESCE($5, start_date),
                expected_end_date = COALESCE($6, expected_end_date),
                status = COALESCE($7, status)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.client)
            .bind(&input.address)
            .bind(input.start_date)
            .bind(input.expected_end_date)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Mark a project finalized. A project with no planned end date gets
    /// stamped with `fallback_end` (the finalization date).
    pub async fn finalize(
        pool: &PgPool,
        id: DbId,
        fallback_end: Date,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                status = 'finalized',
                expected_end_date = COALESCE(expected_end_date, $2)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(fallback_end)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a project by ID. Returns `true` if a row was marked
    /// deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
