//! # filerev-service
//!
//! Business logic for the version history core: snapshot creation with
//! content-hash deduplication, version listings, line diffs, atomic
//! restores, and pin-gated retention.

pub mod context;
pub mod version;

pub use context::RequestContext;
pub use version::diff::{DiffResponse, DiffService};
pub use version::restore::RestoreCoordinator;
pub use version::retention::RetentionGuard;
pub use version::service::VersionService;
