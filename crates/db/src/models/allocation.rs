//! Allocation entity model.

use serde::Serialize;
use sitetrack_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// An allocation row: grants one user access to one project.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Allocation {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub granted_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// An allocation joined with the allocated user, for project member lists.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AllocationWithUser {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub created_at: Timestamp,
}
