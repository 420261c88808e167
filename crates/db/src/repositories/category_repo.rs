//! Repository for the `categories` table.

use sitetrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::{Category, CategoryWithProgress, CreateCategory, UpdateCategory};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, project_id, name, description, deadline, status, created_at, updated_at";

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category, returning the created row.
    ///
    /// A duplicate name within the project violates
    /// `uq_categories_project_name` and surfaces as a conflict.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateCategory,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (project_id, name, description, deadline)
             VALUES ($1, $2, COALESCE($3, ''), $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(project_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.deadline)
            .fetch_one(pool)
            .await
    }

    /// Find a category by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's categories with their derived completion
    /// percentage (mean of task percentages, 0 with no tasks), ordered by
    /// name.
    pub async fn list_with_progress(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<CategoryWithProgress>, sqlx::Error> {
        sqlx::query_as::<_, CategoryWithProgress>(
            "SELECT c.id, c.project_id, c.name, c.description, c.deadline, c.status,
                    COALESCE(ROUND(AVG(t.percent)::numeric, 1), 0)::float8 AS percent_complete,
                    COUNT(t.id) AS task_count,
                    c.created_at, c.updated_at
             FROM categories c
             LEFT JOIN tasks t ON t.category_id = c.id
             WHERE c.project_id = $1
             GROUP BY c.id
             ORDER BY c.name",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Update a category. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                deadline = COALESCE($4, deadline),
                status = COALESCE($5, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.deadline)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category by ID. Returns `true` if a row was removed.
    ///
    /// Tasks cascade; a category whose tasks carry issues or journal rows
    /// fails on the RESTRICT constraints and surfaces as a conflict.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
