//! Storage abstraction for the version history core.
//!
//! [`VersionStore`] is the seam between the services and persistence.
//! Compound operations (appending a version, applying a restore) are
//! part of the trait so each backend can make them atomic its own way:
//! the Postgres backend uses transactions with row locks, the in-memory
//! backend holds a single write guard.

pub mod memory;
pub mod store;

pub use memory::MemoryVersionStore;
pub use store::{AppendOutcome, RestoreOutcome, VersionStore};
