//! Repository for the `allocations` table.

use sitetrack_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::allocation::{Allocation, AllocationWithUser};

/// Provides data access for project access grants.
pub struct AllocationRepo;

impl AllocationRepo {
    /// Grant a user access to a project. Idempotent: re-granting updates
    /// the grantor and returns the existing row.
    pub async fn grant(
        pool: &PgPool,
        user_id: DbId,
        project_id: DbId,
        granted_by: DbId,
    ) -> Result<Allocation, sqlx::Error> {
        sqlx::query_as::<_, Allocation>(
            "INSERT INTO allocations (user_id, project_id, granted_by)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, project_id)
             DO UPDATE SET granted_by = EXCLUDED.granted_by
             RETURNING id, user_id, project_id, granted_by, created_at",
        )
        .bind(user_id)
        .bind(project_id)
        .bind(granted_by)
        .fetch_one(pool)
        .await
    }

    /// Revoke a user's access to a project. Returns `true` if a grant was
    /// removed.
    pub async fn revoke(
        pool: &PgPool,
        user_id: DbId,
        project_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM allocations WHERE user_id = $1 AND project_id = $2")
                .bind(user_id)
                .bind(project_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The ids of every project allocated to a user. Feeds the caller's
    /// access scope.
    pub async fn project_ids_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> =
            sqlx::query_as("SELECT project_id FROM allocations WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// List a project's allocated users.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<AllocationWithUser>, sqlx::Error> {
        sqlx::query_as::<_, AllocationWithUser>(
            "SELECT a.id, a.user_id, a.project_id, u.username, u.display_name, u.role,
                    a.created_at
             FROM allocations a
             JOIN users u ON u.id = a.user_id
             WHERE a.project_id = $1
             ORDER BY u.username",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Remove every grant for a project (used when soft-deleting it).
    pub async fn delete_for_project<'e, E>(executor: E, project_id: DbId) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM allocations WHERE project_id = $1")
            .bind(project_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
