//! # filerev-core
//!
//! Core crate for FileRev, the version-history subsystem of the project
//! store. Contains configuration schemas, typed identifiers, pagination
//! types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other FileRev crates.

pub mod config;
pub mod error;
pub mod result;
pub mod telemetry;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
