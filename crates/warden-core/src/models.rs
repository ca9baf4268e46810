//! Domain models for Warden.

pub mod principal;
pub mod todo;
