//! Authentication service: registration, login, and request
//! authentication.
//!
//! The service is stateless between requests: login issues a signed
//! token and records nothing, and authentication is a pure token check.

use serde::Serialize;
use tracing::{debug, info, warn};
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::principal::{CreatePrincipal, PrincipalView, UpdatePrincipal};
use warden_core::repository::PrincipalRepository;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{self, ValidatedClaims};

/// Input for the registration flow.
#[derive(Debug)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug, Serialize)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Changes a principal may make to their own record.
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub display_name: Option<String>,
    pub password: Option<String>,
}

/// Characters allowed in the local part besides ASCII alphanumerics.
const LOCAL_SPECIALS: &str = ".!#$%&'*+/=?^_`{|}~-";

fn valid_local_part(local: &str) -> bool {
    !local.is_empty()
        && local.len() <= 64
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || LOCAL_SPECIALS.contains(c))
}

/// One dot-separated domain label: 1-63 ASCII alphanumerics or hyphens,
/// not starting or ending with a hyphen.
fn valid_domain_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Trim, lowercase, and check an email address against the same rules
/// the store enforces, plus a mandatory dot in the domain.
fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            valid_local_part(local)
                && domain.contains('.')
                && domain.split('.').all(valid_domain_label)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(AuthError::InvalidEmail)
    }
}

fn normalize_display_name(name: &str) -> Result<String, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::EmptyField("display name"));
    }
    Ok(name.to_string())
}

/// Authentication service.
///
/// Generic over the principal repository so that the auth layer has
/// no dependency on the database crate.
pub struct AuthService<P: PrincipalRepository> {
    principals: P,
    config: AuthConfig,
}

impl<P: PrincipalRepository> AuthService<P> {
    pub fn new(principals: P, config: AuthConfig) -> Self {
        Self { principals, config }
    }

    fn check_password_policy(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.config.min_password_length {
            return Err(AuthError::WeakPassword {
                min_length: self.config.min_password_length,
            });
        }
        Ok(())
    }

    /// Register a new principal. The returned view never carries the
    /// password hash.
    pub async fn register(&self, input: RegisterInput) -> WardenResult<PrincipalView> {
        let email = normalize_email(&input.email)?;
        let display_name = normalize_display_name(&input.display_name)?;
        self.check_password_policy(&input.password)?;

        if self.principals.find_by_email(&email).await?.is_some() {
            return Err(WardenError::AlreadyExists {
                entity: "principal".into(),
            });
        }

        let password_hash = password::hash_password(&input.password, self.config.pepper.as_deref())?;

        let principal = self
            .principals
            .create(CreatePrincipal {
                email,
                display_name,
                password_hash,
            })
            .await?;

        info!(principal_id = %principal.id, "principal registered");
        Ok(principal.into())
    }

    /// Verify email + password and issue an access token.
    ///
    /// An unknown email and a wrong password fail identically.
    pub async fn login(&self, input: LoginInput) -> WardenResult<LoginOutput> {
        let email = input.email.trim().to_lowercase();

        // 1. Look up principal.
        let Some(principal) = self.principals.find_by_email(&email).await? else {
            warn!("login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials.into());
        };

        // 2. Verify password.
        if !password::verify_password(
            &input.password,
            &principal.password_hash,
            self.config.pepper.as_deref(),
        ) {
            warn!("login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials.into());
        }

        // 3. Issue JWT access token.
        let access_token = token::issue_access_token(&principal, &self.config)?;

        info!(principal_id = %principal.id, "login succeeded");
        Ok(LoginOutput {
            access_token,
            token_type: "Bearer".into(),
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Verify a bearer token. Every failure is reported as
    /// `Unauthorized`.
    pub fn authenticate(&self, token: &str) -> WardenResult<ValidatedClaims> {
        token::validate_access_token(token, &self.config).map_err(|e| {
            debug!(error = %e, "authentication failed");
            WardenError::unauthorized(e.to_string())
        })
    }

    /// Authenticate from a raw `Authorization` header value.
    pub fn authenticate_header(&self, header: Option<&str>) -> WardenResult<ValidatedClaims> {
        let header = header.ok_or_else(|| WardenError::unauthorized("missing bearer token"))?;
        let token =
            token::extract_bearer(header).map_err(|e| WardenError::unauthorized(e.to_string()))?;
        self.authenticate(token)
    }

    /// Public view of the authenticated principal, read fresh from the
    /// store.
    pub async fn profile(&self, identity: &ValidatedClaims) -> WardenResult<PrincipalView> {
        self.principals
            .find_by_id(identity.subject_id())
            .await?
            .map(PrincipalView::from)
            .ok_or_else(|| WardenError::unauthorized("principal no longer exists"))
    }

    /// Authenticate `token` and return the caller's public view.
    pub async fn current_principal(&self, token: &str) -> WardenResult<PrincipalView> {
        let identity = self.authenticate(token)?;
        self.profile(&identity).await
    }

    /// Change the caller's display name and/or password.
    pub async fn update_profile(
        &self,
        identity: &ValidatedClaims,
        input: UpdateProfileInput,
    ) -> WardenResult<PrincipalView> {
        if input.display_name.is_none() && input.password.is_none() {
            return Err(WardenError::malformed("nothing to update"));
        }

        let display_name = input
            .display_name
            .as_deref()
            .map(normalize_display_name)
            .transpose()?;

        let password_hash = match input.password.as_deref() {
            Some(pw) => {
                self.check_password_policy(pw)?;
                Some(password::hash_password(pw, self.config.pepper.as_deref())?)
            }
            None => None,
        };

        let principal = self
            .principals
            .update(
                identity.subject_id(),
                UpdatePrincipal {
                    display_name,
                    password_hash,
                },
            )
            .await
            .map_err(|e| match e {
                WardenError::NotFound { .. } => {
                    WardenError::unauthorized("principal no longer exists")
                }
                other => other,
            })?;

        info!(principal_id = %principal.id, "profile updated");
        Ok(principal.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        assert_eq!(normalize_email("  A@X.com ").unwrap(), "a@x.com");
    }

    #[test]
    fn bad_emails_are_rejected() {
        for email in [
            "",
            "alice",
            "@x.com",
            "a@",
            "a@localhost",
            "a@@x.com",
            "a b@x.com",
            "a@.com",
            "a@x.",
            "a@x..com",
            "a@-x.com",
            "a@x-.com",
            "a@x_y.com",
            "a(b)@x.com",
            "a\"b@x.com",
            ".a@x.com",
            "a..b@x.com",
            "ä@x.com",
        ] {
            assert!(
                matches!(normalize_email(email), Err(AuthError::InvalidEmail)),
                "{email:?} should be rejected"
            );
        }
    }

    #[test]
    fn common_addresses_are_accepted() {
        for email in ["first.last@example.com", "a+tag@mail.x-y.org", "o'neil@x.io", "a_b@sub.x.com"] {
            assert_eq!(normalize_email(email).unwrap(), email);
        }
    }

    #[test]
    fn blank_display_name_is_rejected() {
        assert!(normalize_display_name("   ").is_err());
        assert_eq!(normalize_display_name(" Alice ").unwrap(), "Alice");
    }
}
