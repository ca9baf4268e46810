//! Credential store errors and their mapping into [`WardenError`].

use warden_core::error::WardenError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("store transport failed: {0}")]
    Surreal(#[from] surrealdb::Error),

    /// A statement inside a query failed.
    #[error("statement failed: {0}")]
    Query(String),

    #[error("schema migration failed: {0}")]
    Migration(String),

    #[error("{entity} already exists")]
    Conflict { entity: String },

    /// A field value was refused by a schema `ASSERT`.
    #[error("{entity} rejected by schema: {message}")]
    Constraint { entity: String, message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// Classify a statement error reported by `Response::check`.
    ///
    /// SurrealDB reports unique index violations as "Database index
    /// `...` already contains ..." and failed field assertions as
    /// "... but field must conform to: ...".
    pub(crate) fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        Self::classify(entity, err.to_string())
    }

    fn classify(entity: &str, msg: String) -> Self {
        if msg.contains("already contains") {
            DbError::Conflict {
                entity: entity.into(),
            }
        } else if msg.contains("must conform to") {
            DbError::Constraint {
                entity: entity.into(),
                message: msg,
            }
        } else {
            DbError::Query(msg)
        }
    }
}

impl From<DbError> for WardenError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => WardenError::NotFound { entity, id },
            DbError::Conflict { entity } => WardenError::AlreadyExists { entity },
            DbError::Constraint { entity, .. } => {
                WardenError::malformed(format!("{entity} has an invalid field value"))
            }
            DbError::Surreal(_) | DbError::Query(_) => {
                WardenError::StoreUnavailable(err.to_string())
            }
            DbError::Migration(_) => WardenError::Internal(err.to_string()),
        }
    }
}
