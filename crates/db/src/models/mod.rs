//! Entity models and DTOs.
//!
//! One file per entity: a `FromRow` struct mirroring the table plus
//! `CreateX`/`UpdateX` DTOs where the entity is mutable through the API.

pub mod allocation;
pub mod category;
pub mod inspection;
pub mod issue;
pub mod project;
pub mod snapshot;
pub mod task;
pub mod user;
