//! Category entity model and DTOs.

use serde::{Deserialize, Serialize};
use sitetrack_core::types::{Date, DbId, Timestamp};
use sqlx::FromRow;
use validator::Validate;

/// A category row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: String,
    pub deadline: Option<Date>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A category together with its derived completion percentage (mean of its
/// tasks' percentages, 0.0 when it has none).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryWithProgress {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: String,
    pub deadline: Option<Date>,
    pub status: String,
    pub percent_complete: f64,
    pub task_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub deadline: Option<Date>,
}

/// DTO for updating a category. All fields are optional; `status` is the
/// user-edited display state, not derived.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<Date>,
    pub status: Option<String>,
}
