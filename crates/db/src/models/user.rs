//! User entity model.

use serde::Serialize;
use sitetrack_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A user row from the `users` table. The password hash never leaves the
/// repository layer's callers; it is skipped during serialization.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
