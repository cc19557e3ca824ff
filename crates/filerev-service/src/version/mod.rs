//! Version history services.

pub mod diff;
pub mod restore;
pub mod retention;
pub mod service;
