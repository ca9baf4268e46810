//! Warden Auth: password hashing, JWT issuance/validation, the login
//! flow, and ownership-based access control for todos.

pub mod access;
pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod todo;
pub mod token;

pub use access::{AccessDecision, authorize_owner};
pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, LoginInput, LoginOutput, RegisterInput, UpdateProfileInput};
pub use todo::TodoService;
pub use token::{AccessTokenClaims, ValidatedClaims};
