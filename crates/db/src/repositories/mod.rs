//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or a transaction-capable executor) as the first
//! argument. Scope-sensitive reads take the caller's `AccessScope` and
//! translate it into SQL filters.

pub mod allocation_repo;
pub mod category_repo;
pub mod inspection_repo;
pub mod issue_repo;
pub mod project_repo;
pub mod snapshot_repo;
pub mod task_repo;
pub mod user_repo;

pub use allocation_repo::AllocationRepo;
pub use category_repo::CategoryRepo;
pub use inspection_repo::InspectionRepo;
pub use issue_repo::IssueRepo;
pub use project_repo::ProjectRepo;
pub use snapshot_repo::SnapshotRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
