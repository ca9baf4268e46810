//! Versioned SurrealDB schema for principals, todos and the todo id
//! counter.
//!
//! Each migration runs inside a single transaction together with the
//! `_migration` row that records it, so a half-applied version is
//! never marked as done.

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use tracing::{debug, info};

use crate::error::DbError;

const BOOKKEEPING_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

const SCHEMA_V1: &str = "\
-- principal: one row per registered account, keyed by UUID string
DEFINE TABLE principal SCHEMAFULL;
DEFINE FIELD email ON TABLE principal TYPE string \
    ASSERT string::is::email($value);
DEFINE FIELD display_name ON TABLE principal TYPE string;
DEFINE FIELD password_hash ON TABLE principal TYPE string;
DEFINE FIELD created_at ON TABLE principal TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE principal TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_principal_email ON TABLE principal COLUMNS email UNIQUE;

-- todo: keyed by integer, owner_id holds a principal id
DEFINE TABLE todo SCHEMAFULL;
DEFINE FIELD owner_id ON TABLE todo TYPE string;
DEFINE FIELD title ON TABLE todo TYPE string;
DEFINE FIELD description ON TABLE todo TYPE string DEFAULT '';
DEFINE FIELD created_at ON TABLE todo TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE todo TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_todo_owner ON TABLE todo COLUMNS owner_id;

-- id_sequence: one counter record per integer-keyed table
DEFINE TABLE id_sequence SCHEMAFULL;
DEFINE FIELD last_value ON TABLE id_sequence TYPE int DEFAULT 0;
";

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

#[derive(Debug, Deserialize)]
struct AppliedVersion {
    version: u32,
}

/// Highest recorded version, or 0 on a fresh database.
async fn applied_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut response = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let rows: Vec<AppliedVersion> = response.take(0)?;
    Ok(rows.first().map_or(0, |row| row.version))
}

async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    let script = format!(
        "BEGIN TRANSACTION;\n{}\nCREATE _migration SET version = $version, name = $name;\nCOMMIT TRANSACTION;",
        migration.sql
    );

    db.query(script)
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!("v{} ({}): {e}", migration.version, migration.name))
        })?;
    Ok(())
}

/// Bring the database up to the latest schema version.
///
/// Safe to call on every start: versions already recorded in
/// `_migration` are skipped.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(BOOKKEEPING_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(format!("bookkeeping table: {e}")))?;

    let current = applied_version(db).await?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        debug!(version = current, "schema is up to date");
        return Ok(());
    }

    for migration in pending {
        info!(version = migration.version, name = migration.name, "applying migration");
        apply(db, migration).await?;
    }

    info!(version = applied_version(db).await?, "schema migrated");
    Ok(())
}
