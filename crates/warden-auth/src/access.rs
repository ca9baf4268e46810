//! Ownership-based access control.

use warden_core::error::{WardenError, WardenResult};

use crate::token::ValidatedClaims;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny,
}

impl AccessDecision {
    /// Turn a denial into `ForbiddenAccess` for the named record.
    pub fn into_result(self, entity: &str, id: impl ToString) -> WardenResult<()> {
        match self {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny => Err(WardenError::forbidden(entity, id)),
        }
    }
}

/// Allow iff the authenticated principal is the stored owner.
///
/// `owner_id` must come from the stored record, never from the request.
pub fn authorize_owner(identity: &ValidatedClaims, owner_id: &str) -> AccessDecision {
    if identity.subject_id() == owner_id {
        AccessDecision::Allow
    } else {
        AccessDecision::Deny
    }
}
