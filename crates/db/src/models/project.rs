//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sitetrack_core::types::{Date, DbId, Timestamp};
use sqlx::FromRow;
use validator::Validate;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub client: String,
    pub address: String,
    pub start_date: Option<Date>,
    pub expected_end_date: Option<Date>,
    pub status: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn is_finalized(&self) -> bool {
        self.status == "finalized"
    }
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub client: Option<String>,
    pub address: Option<String>,
    pub start_date: Option<Date>,
    pub expected_end_date: Option<Date>,
}

/// DTO for updating an existing project. All fields are optional.
/// `status` may move a project between `active` and `finalized` (the
/// admin's way to reopen a finalized project).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub client: Option<String>,
    pub address: Option<String>,
    pub start_date: Option<Date>,
    pub expected_end_date: Option<Date>,
    pub status: Option<String>,
}
