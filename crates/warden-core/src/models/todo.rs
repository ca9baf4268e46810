//! Todo domain model: the owned resource guarded by access control.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    /// Principal id of the creator. Set once at creation.
    pub owner_id: String,
    pub title: String,
    pub description: String,
}

/// Payload for creating a todo.
///
/// Carries no owner field: the owner is always the authenticated
/// caller. Unknown fields are rejected so a client-supplied owner is
/// an error rather than silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl UpdateTodo {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}
