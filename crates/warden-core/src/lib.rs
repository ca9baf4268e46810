//! Warden Core: domain models, repository traits, and error types
//! shared by every Warden crate.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{WardenError, WardenResult};
