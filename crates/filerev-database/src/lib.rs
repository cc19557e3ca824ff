//! PostgreSQL backend for the FileRev version store.

pub mod connection;
pub mod store;

pub use connection::DatabasePool;
pub use store::PgVersionStore;
