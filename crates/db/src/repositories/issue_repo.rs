//! Repository for the `issues` and `issue_solutions` tables.

use sitetrack_core::issue_state::IssueTransition;
use sitetrack_core::scope::AccessScope;
use sitetrack_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::issue::{CreateIssue, Issue, IssueFilter, IssueSolution, IssueStatusCounts};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, category_id, task_id, description, priority, \
                       responsible_id, problem_photo_ref, resolution_photo_ref, status, \
                       due_date, opened_at, closed_at, created_at, updated_at";

/// Aliased column list for joined queries.
const ALIASED_COLUMNS: &str =
    "i.id, i.project_id, i.category_id, i.task_id, i.description, i.priority, \
     i.responsible_id, i.problem_photo_ref, i.resolution_photo_ref, i.status, \
     i.due_date, i.opened_at, i.closed_at, i.created_at, i.updated_at";

/// Provides data access for issues and their solution journal.
pub struct IssueRepo;

impl IssueRepo {
    /// Open a new issue against a task.
    ///
    /// `category_id` is the task's owning category, resolved by the caller.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        category_id: Option<DbId>,
        input: &CreateIssue,
    ) -> Result<Issue, sqlx::Error> {
        let query = format!(
            "INSERT INTO issues
                (project_id, category_id, task_id, description, priority,
                 responsible_id, due_date, problem_photo_ref)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'medium'), $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(project_id)
            .bind(category_id)
            .bind(input.task_id)
            .bind(&input.description)
            .bind(&input.priority)
            .bind(input.responsible_id)
            .bind(input.due_date)
            .bind(&input.problem_photo_ref)
            .fetch_one(pool)
            .await
    }

    /// Find a visible issue by ID (scope filter on its project).
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        scope: &AccessScope,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM issues
             WHERE id = $1 AND ($2::bigint[] IS NULL OR project_id = ANY($2))"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(scope.id_filter())
            .fetch_optional(pool)
            .await
    }

    /// List visible issues, newest first, with optional status and text
    /// filters. The text filter matches issue description, project name or
    /// task name.
    pub async fn list(
        pool: &PgPool,
        scope: &AccessScope,
        filter: &IssueFilter,
    ) -> Result<Vec<Issue>, sqlx::Error> {
        let query = format!(
            "SELECT {ALIASED_COLUMNS}
             FROM issues i
             JOIN projects p ON p.id = i.project_id
             JOIN tasks t ON t.id = i.task_id
             WHERE ($1::bigint[] IS NULL OR i.project_id = ANY($1))
               AND ($2::text IS NULL OR i.status = $2)
               AND ($3::text IS NULL OR i.description ILIKE '%' || $3 || '%'
                    OR p.name ILIKE '%' || $3 || '%'
                    OR t.name ILIKE '%' || $3 || '%')
             ORDER BY i.opened_at DESC, i.id DESC"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(scope.id_filter())
            .bind(&filter.status)
            .bind(&filter.q)
            .fetch_all(pool)
            .await
    }

    /// Per-status counts over the same filtered set as [`IssueRepo::list`]
    /// (ignoring the status filter itself).
    pub async fn counts(
        pool: &PgPool,
        scope: &AccessScope,
        q: Option<&str>,
    ) -> Result<IssueStatusCounts, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT i.status, COUNT(*)
             FROM issues i
             JOIN projects p ON p.id = i.project_id
             JOIN tasks t ON t.id = i.task_id
             WHERE ($1::bigint[] IS NULL OR i.project_id = ANY($1))
               AND ($2::text IS NULL OR i.description ILIKE '%' || $2 || '%'
                    OR p.name ILIKE '%' || $2 || '%'
                    OR t.name ILIKE '%' || $2 || '%')
             GROUP BY i.status",
        )
        .bind(scope.id_filter())
        .bind(q)
        .fetch_all(pool)
        .await?;

        let mut counts = IssueStatusCounts::default();
        for (status, count) in rows {
            match status.as_str() {
                "open" => counts.open = count,
                "in_progress" => counts.in_progress = count,
                "resolved" => counts.resolved = count,
                _ => {}
            }
        }
        Ok(counts)
    }

    /// List one project's issues, newest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Issue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM issues
             WHERE project_id = $1
             ORDER BY opened_at DESC, id DESC"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Per-status counts for one project.
    pub async fn counts_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<IssueStatusCounts, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM issues WHERE project_id = $1 GROUP BY status",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        let mut counts = IssueStatusCounts::default();
        for (status, count) in rows {
            match status.as_str() {
                "open" => counts.open = count,
                "in_progress" => counts.in_progress = count,
                "resolved" => counts.resolved = count,
                _ => {}
            }
        }
        Ok(counts)
    }

    /// Count a task's issues currently in the open state.
    pub async fn count_open_for_task<'e, E>(executor: E, task_id: DbId) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM issues WHERE task_id = $1 AND status = 'open'")
                .bind(task_id)
                .fetch_one(executor)
                .await?;
        Ok(count)
    }

    /// Apply a planned status transition and, when resolving, journal the
    /// solution note -- one transaction.
    pub async fn apply_transition(
        pool: &PgPool,
        id: DbId,
        transition: &IssueTransition,
        user_id: DbId,
        resolution_photo_ref: Option<&str>,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE issues SET
                status = $2,
                closed_at = $3,
                resolution_photo_ref = COALESCE($4, resolution_photo_ref)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let issue = sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(transition.status.as_str())
            .bind(transition.closed_at)
            .bind(resolution_photo_ref)
            .fetch_optional(&mut *tx)
            .await?;

        if issue.is_some() {
            if let Some(note) = &transition.solution_note {
                sqlx::query("INSERT INTO issue_solutions (issue_id, user_id, note) VALUES ($1, $2, $3)")
                    .bind(id)
                    .bind(user_id)
                    .bind(note)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(issue)
    }

    /// List an issue's solution journal, oldest first.
    pub async fn list_solutions(
        pool: &PgPool,
        issue_id: DbId,
    ) -> Result<Vec<IssueSolution>, sqlx::Error> {
        sqlx::query_as::<_, IssueSolution>(
            "SELECT id, issue_id, user_id, note, created_at
             FROM issue_solutions WHERE issue_id = $1 ORDER BY created_at, id",
        )
        .bind(issue_id)
        .fetch_all(pool)
        .await
    }
}
