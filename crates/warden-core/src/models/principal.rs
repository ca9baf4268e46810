//! Principal (user) domain model.

use serde::Serialize;

/// A registered identity as stored in the credential store.
///
/// Not `Serialize`; use [`PrincipalView`] for anything outbound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// UUID v4 string assigned by the store.
    pub id: String,
    pub email: String,
    pub display_name: String,
    /// Argon2id PHC string.
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct CreatePrincipal {
    pub email: String,
    pub display_name: String,
    /// Already hashed; plaintext never reaches the store.
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePrincipal {
    pub display_name: Option<String>,
    pub password_hash: Option<String>,
}

/// Public projection of a [`Principal`] with the credential stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrincipalView {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

impl From<Principal> for PrincipalView {
    fn from(p: Principal) -> Self {
        Self {
            id: p.id,
            email: p.email,
            display_name: p.display_name,
        }
    }
}
