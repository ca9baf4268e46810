//! Error types for the Warden system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WardenError {
    /// Login failed. Never says whether the email or the password was
    /// wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("access to {entity} {id} denied")]
    ForbiddenAccess { entity: String, id: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    #[error("{entity} already exists")]
    AlreadyExists { entity: String },

    #[error("malformed input: {message}")]
    Malformed { message: String },

    #[error("credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl WardenError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn forbidden(entity: &str, id: impl ToString) -> Self {
        Self::ForbiddenAccess {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Only a backing-store outage is worth retrying; every other kind
    /// is a definitive answer.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

pub type WardenResult<T> = Result<T, WardenError>;
