//! Authentication error types.

use thiserror::Error;
use warden_core::error::WardenError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is malformed")]
    MalformedToken,

    #[error("email address is not valid")]
    InvalidEmail,

    #[error("password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("invalid auth configuration: {0}")]
    InvalidConfig(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for WardenError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => WardenError::InvalidCredentials,
            AuthError::TokenExpired | AuthError::InvalidSignature | AuthError::MalformedToken => {
                WardenError::Unauthorized {
                    reason: err.to_string(),
                }
            }
            AuthError::InvalidEmail | AuthError::WeakPassword { .. } | AuthError::EmptyField(_) => {
                WardenError::Malformed {
                    message: err.to_string(),
                }
            }
            AuthError::InvalidConfig(_) | AuthError::Crypto(_) => {
                WardenError::Internal(err.to_string())
            }
        }
    }
}
