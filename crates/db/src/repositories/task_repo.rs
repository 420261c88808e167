//! Repository for the `tasks` table.
//!
//! `status` and `actual_end` are derived fields: every percentage write
//! goes through [`TaskRepo::apply_transition`] with a transition planned by
//! `sitetrack_core::task_state`, so the stored derived state never drifts
//! from the raw percentage.

use sitetrack_core::task_state::TaskTransition;
use sitetrack_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::task::{CreateTask, ProjectTaskStats, Task, TaskWithProject, UpdateTask};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, category_id, name, description, position, planned_start, \
                       planned_end, actual_end, status, percent, created_at, updated_at";

/// Column list for task-with-project joins (aliased to the task table).
const JOINED_COLUMNS: &str = "t.id, t.category_id, c.project_id, t.name, t.description, \
                              t.position, t.planned_start, t.planned_end, t.actual_end, \
                              t.status, t.percent";

/// Provides data access for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task with its initial derived state.
    ///
    /// The caller plans `transition` through the task state machine so the
    /// initial percentage produces consistent status/completion fields.
    pub async fn create(
        pool: &PgPool,
        category_id: DbId,
        input: &CreateTask,
        transition: &TaskTransition,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks
                (category_id, name, description, position, planned_start, planned_end,
                 percent, status, actual_end)
             VALUES ($1, $2, COALESCE($3, ''), COALESCE($4, 1), $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(category_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.position)
            .bind(input.planned_start)
            .bind(input.planned_end)
            .bind(transition.percent)
            .bind(transition.status.as_str())
            .bind(transition.actual_end)
            .fetch_one(pool)
            .await
    }

    /// Find a task joined with its owning project id.
    pub async fn find_with_project<'e, E>(
        executor: E,
        id: DbId,
    ) -> Result<Option<TaskWithProject>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM tasks t
             JOIN categories c ON c.id = t.category_id
             WHERE t.id = $1"
        );
        sqlx::query_as::<_, TaskWithProject>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List every task under a project in (category, position, id) order.
    pub async fn list_by_project<'e, E>(
        executor: E,
        project_id: DbId,
    ) -> Result<Vec<TaskWithProject>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM tasks t
             JOIN categories c ON c.id = t.category_id
             WHERE c.project_id = $1
             ORDER BY t.category_id, t.position, t.id"
        );
        sqlx::query_as::<_, TaskWithProject>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await
    }

    /// Update task metadata. Percentage changes go through
    /// [`TaskRepo::apply_transition`] instead.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                position = COALESCE($4, position),
                planned_start = COALESCE($5, planned_start),
                planned_end = COALESCE($6, planned_end)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.position)
            .bind(input.planned_start)
            .bind(input.planned_end)
            .fetch_optional(pool)
            .await
    }

    /// Persist a planned percentage transition (percent, derived status,
    /// completion date) in one statement.
    pub async fn apply_transition<'e, E>(
        executor: E,
        id: DbId,
        transition: &TaskTransition,
    ) -> Result<Option<Task>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE tasks SET percent = $2, status = $3, actual_end = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(transition.percent)
            .bind(transition.status.as_str())
            .bind(transition.actual_end)
            .fetch_optional(executor)
            .await
    }

    /// Aggregated task statistics for a set of projects, in a single
    /// grouped pass. Projects with no tasks produce no row; callers
    /// default those to an empty stats struct.
    pub async fn stats_by_projects<'e, E>(
        executor: E,
        project_ids: &[DbId],
    ) -> Result<Vec<ProjectTaskStats>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, ProjectTaskStats>(
            "SELECT c.project_id,
                    COUNT(t.id) AS total,
                    COUNT(t.id) FILTER (WHERE t.status = 'completed') AS completed,
                    AVG(t.percent)::float8 AS avg_percent,
                    COUNT(t.id) FILTER (WHERE t.percent NOT IN (0, 100)) AS partial
             FROM tasks t
             JOIN categories c ON c.id = t.category_id
             WHERE c.project_id = ANY($1)
             GROUP BY c.project_id",
        )
        .bind(project_ids)
        .fetch_all(executor)
        .await
    }

    /// Delete a task by ID. Returns `true` if a row was removed.
    ///
    /// Tasks referenced by issues or inspection journal rows fail on the
    /// RESTRICT constraints and surface as a conflict.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
