//! Progress snapshot entity model.

use serde::Serialize;
use sitetrack_core::types::{Date, DbId, Timestamp};
use sqlx::FromRow;

/// One persisted (date, real%, expected%) record for a project.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgressSnapshot {
    pub id: DbId,
    pub project_id: DbId,
    pub snapshot_date: Date,
    pub real_pct: f64,
    pub expected_pct: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProgressSnapshot {
    /// Convert to the core timeline/milestone input point.
    pub fn as_point(&self) -> sitetrack_core::timeline::SnapshotPoint {
        sitetrack_core::timeline::SnapshotPoint {
            date: self.snapshot_date,
            real: self.real_pct,
            expected: self.expected_pct,
        }
    }
}
