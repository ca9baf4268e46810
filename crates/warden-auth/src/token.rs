//! HS256 access token issuance and verification.
//!
//! Tokens are stateless: validity is a function of the signature, the
//! issuer, and the current time only. [`decode_token`] takes `now`
//! explicitly so that it stays a pure function; the `*_access_token`
//! helpers read the wall clock.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;
use warden_core::models::principal::Principal;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (principal ID).
    pub sub: String,
    pub email: String,
    /// Display name at the time of issue.
    pub name: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp). The token is invalid from this
    /// second on.
    pub exp: i64,
    /// Unique token ID.
    pub jti: String,
}

impl AccessTokenClaims {
    pub fn new(principal: &Principal, issuer: &str, issued_at: i64, ttl_secs: u64) -> Self {
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        Self {
            sub: principal.id.clone(),
            email: principal.email.clone(),
            name: principal.display_name.clone(),
            iss: issuer.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Sign `claims` with HS256.
pub fn encode_token(claims: &AccessTokenClaims, secret: &str) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Verify and decode an HS256 token as of `now` (Unix seconds).
///
/// The signature is checked before anything in the payload is looked
/// at, so a tampered token is never reported as merely expired.
pub fn decode_token(
    token: &str,
    secret: &str,
    issuer: &str,
    now: i64,
) -> Result<AccessTokenClaims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);
    // Expiry is checked below against the caller-supplied clock.
    validation.validate_exp = false;
    validation.leeway = 0;

    let claims = jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "rejected access token");
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    AuthError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::MalformedToken,
            }
        })?;

    if now >= claims.exp {
        return Err(AuthError::TokenExpired);
    }

    Ok(claims)
}

/// Issue a signed access token for `principal` using the configured
/// issuer and lifetime.
pub fn issue_access_token(principal: &Principal, config: &AuthConfig) -> Result<String, AuthError> {
    let claims = AccessTokenClaims::new(
        principal,
        &config.jwt_issuer,
        Utc::now().timestamp(),
        config.access_token_lifetime_secs,
    );
    encode_token(&claims, &config.jwt_secret)
}

/// Decode and verify an access token against the current time.
pub fn decode_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    decode_token(
        token,
        &config.jwt_secret,
        &config.jwt_issuer,
        Utc::now().timestamp(),
    )
}

/// Validated JWT claims: a newtype proving the token was verified.
///
/// This is the identity threaded through every protected operation.
/// It can only be obtained by verifying a token.
#[derive(Debug, Clone)]
pub struct ValidatedClaims(AccessTokenClaims);

impl ValidatedClaims {
    /// The authenticated principal's id.
    pub fn subject_id(&self) -> &str {
        &self.0.sub
    }

    pub fn claims(&self) -> &AccessTokenClaims {
        &self.0
    }
}

/// Validate a JWT access token (signature, issuer, expiry) and return
/// the verified claims. No database lookup is performed.
pub fn validate_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<ValidatedClaims, AuthError> {
    decode_access_token(token, config).map(ValidatedClaims)
}

/// Pull the token out of an `Authorization` header value.
///
/// Accepts `Bearer <token>` (scheme is case-insensitive) or a bare
/// token.
pub fn extract_bearer(header: &str) -> Result<&str, AuthError> {
    let header = header.trim();
    if header.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedToken);
    }

    let token = match header.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return Err(AuthError::MalformedToken),
        None => header,
    };

    if token.is_empty() {
        return Err(AuthError::MalformedToken);
    }
    Ok(token)
}
