//! Issue ("pendencia") status transitions.
//!
//! Issues move `open -> in_progress -> resolved`. The closing timestamp is
//! present exactly when the status is resolved; resolving requires a
//! non-empty solution note, which becomes a journal entry alongside the
//! status change.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    InProgress,
    Resolved,
}

impl IssueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "in_progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }
}

/// Issue priority. Purely informational ordering for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuePriority {
    Low,
    Medium,
    High,
}

impl IssuePriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// The fields to persist for an issue status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueTransition {
    pub status: IssueStatus,
    pub closed_at: Option<Timestamp>,
    /// Present only when resolving: the solution note to journal.
    pub solution_note: Option<String>,
}

/// Plan a status change requested by a user.
///
/// Only `in_progress` and `resolved` are reachable through this operation
/// (issues are born open). Resolving demands a non-empty solution note and
/// stamps `closed_at = now`; moving to `in_progress` clears it.
pub fn plan_status_change(
    new_status: IssueStatus,
    solution_note: Option<&str>,
    now: Timestamp,
) -> Result<IssueTransition, CoreError> {
    match new_status {
        IssueStatus::Open => Err(CoreError::Validation(
            "Invalid status for update.".to_string(),
        )),
        IssueStatus::InProgress => Ok(IssueTransition {
            status: IssueStatus::InProgress,
            closed_at: None,
            solution_note: None,
        }),
        IssueStatus::Resolved => {
            let note = solution_note.map(str::trim).unwrap_or_default();
            if note.is_empty() {
                return Err(CoreError::Validation(
                    "A solution note is required to resolve an issue.".to_string(),
                ));
            }
            Ok(IssueTransition {
                status: IssueStatus::Resolved,
                closed_at: Some(now),
                solution_note: Some(note.to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn resolving_stamps_closed_at_and_keeps_note() {
        let t = plan_status_change(IssueStatus::Resolved, Some("  replaced the valve "), now())
            .unwrap();
        assert_eq!(t.status, IssueStatus::Resolved);
        assert_eq!(t.closed_at, Some(now()));
        assert_eq!(t.solution_note.as_deref(), Some("replaced the valve"));
    }

    #[test]
    fn resolving_without_note_rejected() {
        assert_matches!(
            plan_status_change(IssueStatus::Resolved, None, now()),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            plan_status_change(IssueStatus::Resolved, Some("   "), now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn in_progress_clears_closed_at() {
        let t = plan_status_change(IssueStatus::InProgress, None, now()).unwrap();
        assert_eq!(t.status, IssueStatus::InProgress);
        assert_eq!(t.closed_at, None);
        assert_eq!(t.solution_note, None);
    }

    #[test]
    fn reopening_is_not_a_valid_update() {
        assert_matches!(
            plan_status_change(IssueStatus::Open, None, now()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn status_round_trips() {
        for status in [IssueStatus::Open, IssueStatus::InProgress, IssueStatus::Resolved] {
            assert_eq!(IssueStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn priority_round_trips() {
        for p in [IssuePriority::Low, IssuePriority::Medium, IssuePriority::High] {
            assert_eq!(IssuePriority::parse(p.as_str()), Some(p));
        }
    }
}
