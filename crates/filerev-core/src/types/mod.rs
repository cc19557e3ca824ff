//! Shared domain-neutral types.

pub mod id;
pub mod pagination;

pub use id::{FileId, ProjectId, UserId, VersionId};
pub use pagination::{PageRequest, PageResponse};
