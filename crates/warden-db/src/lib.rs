//! Warden Database: SurrealDB connection management, schema
//! migrations, and the credential store implementations of the
//! `warden-core` repository traits.

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::run_migrations;
