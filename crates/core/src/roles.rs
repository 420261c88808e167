//! User roles and role-derived capabilities.
//!
//! Roles form a total order (`admin > level2 > level1`). The string forms
//! must match the seed data in the `users` table migration.

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_LEVEL2: &str = "level2";
pub const ROLE_LEVEL1: &str = "level1";

/// A user's role. Ordering follows authority: `Level1 < Level2 < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Level1,
    Level2,
    Admin,
}

impl Role {
    /// The database string form of this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Level2 => ROLE_LEVEL2,
            Self::Level1 => ROLE_LEVEL1,
        }
    }

    /// Parse a role from its database string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            ROLE_ADMIN => Some(Self::Admin),
            ROLE_LEVEL2 => Some(Self::Level2),
            ROLE_LEVEL1 => Some(Self::Level1),
            _ => None,
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Level2 => "Level 2",
            Self::Level1 => "Level 1",
        }
    }

    /// Whether this role may edit project structure (categories, tasks,
    /// project metadata).
    pub fn can_manage_structure(self) -> bool {
        self >= Self::Level2
    }

    /// Whether this role may record inspections, open issues and update
    /// task percentages. All roles can.
    pub fn can_record_field_data(self) -> bool {
        true
    }

    /// Roles this actor may grant or administer. Admins manage both lower
    /// levels, level2 manages level1 only, level1 manages nobody.
    pub fn assignable_roles(self) -> &'static [Role] {
        match self {
            Self::Admin => &[Role::Level2, Role::Level1],
            Self::Level2 => &[Role::Level1],
            Self::Level1 => &[],
        }
    }
}

/// The set of users offered as "responsible" choices when opening an issue:
/// an actor may assign to anyone whose role it can administer, plus itself.
///
/// Returns `true` when `candidate_role` is an acceptable assignee for
/// `actor_role` (`is_self` covers self-assignment).
pub fn may_assign_responsible(actor_role: Role, candidate_role: Role, is_self: bool) -> bool {
    is_self || actor_role.assignable_roles().contains(&candidate_role)
}
