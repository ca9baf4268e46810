//! Authentication configuration.

use crate::error::AuthError;

/// Shortest HMAC secret accepted for HS256 signing.
pub const MIN_SECRET_LEN: usize = 32;

/// Configuration for the authentication service.
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared secret for HS256 token signing and verification.
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 3600 = 1 hour).
    pub access_token_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Minimum password length for registration and password changes.
    pub min_password_length: usize,
}

impl AuthConfig {
    /// Reject configurations that would make tokens forgeable.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::InvalidConfig(format!(
                "jwt secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if self.jwt_issuer.is_empty() {
            return Err(AuthError::InvalidConfig("jwt issuer must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_lifetime_secs: 3600,
            jwt_issuer: "warden".into(),
            pepper: None,
            min_password_length: 6,
        }
    }
}

// Hand-written so the secret and pepper never end up in logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_lifetime_secs", &self.access_token_lifetime_secs)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .field("min_password_length", &self.min_password_length)
            .finish()
    }
}
