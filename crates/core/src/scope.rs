//! Project visibility scope.
//!
//! Every read and mutation path resolves the caller's [`AccessScope`] first
//! and filters through it. Admins see every live project; level2/level1 see
//! only projects they are explicitly allocated to; anonymous principals see
//! nothing. The scope is a pure value with no side effects -- repositories
//! receive it and translate it into SQL filters.

use std::collections::BTreeSet;

use crate::roles::Role;
use crate::types::DbId;

/// The set of projects a principal may read or mutate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessScope {
    role: Option<Role>,
    allocated: BTreeSet<DbId>,
}

impl AccessScope {
    /// Scope of an unauthenticated principal: sees nothing.
    pub fn anonymous() -> Self {
        Self {
            role: None,
            allocated: BTreeSet::new(),
        }
    }

    /// Scope of an authenticated user with the given allocations.
    ///
    /// The allocation list is ignored for admins, who are unrestricted.
    pub fn for_user(role: Role, allocated: impl IntoIterator<Item = DbId>) -> Self {
        Self {
            role: Some(role),
            allocated: allocated.into_iter().collect(),
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    /// Whether the given project is inside this scope.
    pub fn is_visible(&self, project_id: DbId) -> bool {
        match self.role {
            None => false,
            Some(Role::Admin) => true,
            Some(_) => self.allocated.contains(&project_id),
        }
    }

    /// The explicit id filter for SQL queries.
    ///
    /// `None` means unrestricted (admin); `Some(ids)` means restrict to
    /// exactly these ids -- possibly empty, which must match no rows.
    pub fn id_filter(&self) -> Option<Vec<DbId>> {
        match self.role {
            Some(Role::Admin) => None,
            Some(_) => Some(self.allocated.iter().copied().collect()),
            None => Some(Vec::new()),
        }
    }
}
