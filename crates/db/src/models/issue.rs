//! Issue entity model and DTOs.

use serde::{Deserialize, Serialize};
use sitetrack_core::types::{Date, DbId, Timestamp};
use sqlx::FromRow;
use validator::Validate;

/// An issue row from the `issues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Issue {
    pub id: DbId,
    pub project_id: DbId,
    pub category_id: Option<DbId>,
    pub task_id: DbId,
    pub description: String,
    pub priority: String,
    pub responsible_id: Option<DbId>,
    pub problem_photo_ref: Option<String>,
    pub resolution_photo_ref: Option<String>,
    pub status: String,
    pub due_date: Option<Date>,
    pub opened_at: Timestamp,
    pub closed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A solution journal entry appended when an issue is resolved.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IssueSolution {
    pub id: DbId,
    pub issue_id: DbId,
    pub user_id: Option<DbId>,
    pub note: String,
    pub created_at: Timestamp,
}

/// Per-status issue counts for one scope's list view.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueStatusCounts {
    pub open: i64,
    pub in_progress: i64,
    pub resolved: i64,
}

/// DTO for opening a new issue.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIssue {
    pub task_id: DbId,
    #[validate(length(min = 1))]
    pub description: String,
    pub priority: Option<String>,
    pub responsible_id: Option<DbId>,
    pub due_date: Option<Date>,
    pub problem_photo_ref: Option<String>,
}

/// Filters for the issue list view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFilter {
    pub status: Option<String>,
    /// Substring match against issue description, project name or task name.
    pub q: Option<String>,
}
