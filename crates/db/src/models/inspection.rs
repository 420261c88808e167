//! Inspection entity models and DTOs.

use serde::{Deserialize, Serialize};
use sitetrack_core::types::{Date, DbId, Timestamp};
use sqlx::FromRow;

/// An inspection row from the `inspections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Inspection {
    pub id: DbId,
    pub project_id: DbId,
    pub author_id: DbId,
    pub inspected_at: Timestamp,
    pub inspection_date: Date,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub observations: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An ordered photo evidence record attached to an inspection.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InspectionPhoto {
    pub id: DbId,
    pub inspection_id: DbId,
    pub storage_ref: String,
    pub caption: String,
    pub position: i32,
    pub created_at: Timestamp,
}

/// An append-only journal row recording one task's percentage change
/// during an inspection.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskChangeRecord {
    pub id: DbId,
    pub inspection_id: DbId,
    pub task_id: DbId,
    pub percent_before: i32,
    pub percent_after: i32,
    pub created_at: Timestamp,
}

/// Photo metadata submitted with an inspection. The bytes live with the
/// file-storage collaborator; only the stored reference arrives here.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectionPhotoInput {
    pub storage_ref: String,
    pub caption: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: Option<i64>,
}
