//! Task entity model and DTOs.

use serde::{Deserialize, Serialize};
use sitetrack_core::types::{Date, DbId, Timestamp};
use sqlx::FromRow;
use validator::Validate;

/// A task row from the `tasks` table.
///
/// `status` and `actual_end` are derived from `percent`; repositories only
/// write them through the state-transition update.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub category_id: DbId,
    pub name: String,
    pub description: String,
    pub position: i32,
    pub planned_start: Option<Date>,
    pub planned_end: Option<Date>,
    pub actual_end: Option<Date>,
    pub status: String,
    pub percent: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A task joined with its owning project id, for scope checks and
/// snapshot triggering.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskWithProject {
    pub id: DbId,
    pub category_id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: String,
    pub position: i32,
    pub planned_start: Option<Date>,
    pub planned_end: Option<Date>,
    pub actual_end: Option<Date>,
    pub status: String,
    pub percent: i32,
}

/// Aggregated per-project task statistics from a single grouped query.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectTaskStats {
    pub project_id: DbId,
    pub total: i64,
    pub completed: i64,
    pub avg_percent: Option<f64>,
    pub partial: i64,
}

impl ProjectTaskStats {
    /// Convert to the core aggregation input.
    pub fn as_core(&self) -> sitetrack_core::progress::TaskStats {
        sitetrack_core::progress::TaskStats {
            total: self.total,
            completed: self.completed,
            avg_percent: self.avg_percent,
            partial: self.partial,
        }
    }
}

/// DTO for creating a new task. The initial percentage flows through the
/// state machine like any other edit.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub position: Option<i32>,
    pub planned_start: Option<Date>,
    pub planned_end: Option<Date>,
    #[validate(range(min = 0, max = 100))]
    pub percent: Option<i64>,
}

/// DTO for updating task metadata (not the percentage -- that goes through
/// the dedicated percent endpoint).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub position: Option<i32>,
    pub planned_start: Option<Date>,
    pub planned_end: Option<Date>,
}
