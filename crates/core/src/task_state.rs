//! Task status derivation.
//!
//! A task's status and actual-completion date are derived from its
//! completion percentage on every save, never edited directly. The rules:
//! 100 -> completed (stamping the completion date on entry), anything in
//! 1..=99 -> in progress, 0 -> not started; both non-completed states clear
//! the completion date. A task cannot reach 100% while it still has open
//! issues.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Date;

/// Derived task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
    Blocked,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
            Self::Blocked => "Blocked",
        }
    }
}

/// The derived fields to persist after a percentage change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTransition {
    pub percent: i32,
    pub status: TaskStatus,
    pub actual_end: Option<Date>,
}

/// Validate a raw percentage value.
///
/// Accepts integers in `0..=100`; anything else is a validation error
/// naming the task.
pub fn validate_percent(raw: i64, task_name: &str) -> Result<i32, CoreError> {
    if !(0..=100).contains(&raw) {
        return Err(CoreError::Validation(format!(
            "Invalid percentage for task '{task_name}'. Use 0..100."
        )));
    }
    Ok(raw as i32)
}

/// Derive the status/completion-date fields for a new percentage.
///
/// `current_actual_end` is kept as-is when the task was already completed
/// (re-saving a completed task does not re-stamp the date). `open_issues`
/// is the task's count of issues in the open state; completion is refused
/// while it is non-zero.
pub fn plan_transition(
    current_status: TaskStatus,
    current_actual_end: Option<Date>,
    new_percent: i32,
    open_issues: i64,
    today: Date,
    task_name: &str,
) -> Result<TaskTransition, CoreError> {
    let transition = if new_percent == 100 {
        let actual_end = if current_status == TaskStatus::Completed {
            current_actual_end
        } else {
            Some(today)
        };
        TaskTransition {
            percent: new_percent,
            status: TaskStatus::Completed,
            actual_end,
        }
    } else if new_percent > 0 {
        TaskTransition {
            percent: new_percent,
            status: TaskStatus::InProgress,
            actual_end: None,
        }
    } else {
        TaskTransition {
            percent: new_percent,
            status: TaskStatus::NotStarted,
            actual_end: None,
        }
    };

    if transition.status == TaskStatus::Completed && open_issues > 0 {
        return Err(CoreError::Invariant(format!(
            "Cannot complete task '{task_name}' while it has open issues."
        )));
    }

    Ok(transition)
}

/// Role gate for percentage edits, checked before the state machine runs.
///
/// Level1 users may not change the percentage of a task that is already
/// completed; re-submitting the current value is an allowed no-op.
pub fn ensure_may_edit_percent(
    role: crate::roles::Role,
    current_status: TaskStatus,
    current_percent: i32,
    new_percent: i32,
    task_name: &str,
) -> Result<(), CoreError> {
    if role == crate::roles::Role::Level1
        && current_status == TaskStatus::Completed
        && new_percent != current_percent
    {
        return Err(CoreError::Forbidden(format!(
            "Task '{task_name}' is completed: only Level 2 or Admin may change it."
        )));
    }
    Ok(())
}
