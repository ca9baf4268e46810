//! Todo service: owner-guarded CRUD over [`TodoRepository`].
//!
//! Every read and mutation of an existing todo resolves existence
//! first (`NotFound`), then ownership against the stored record
//! (`ForbiddenAccess`), then performs a store operation that is itself
//! conditioned on the stored owner.

use tracing::{info, warn};
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::todo::{CreateTodo, Todo, UpdateTodo};
use warden_core::repository::{PaginatedResult, Pagination, TodoRepository};

use crate::access::{AccessDecision, authorize_owner};
use crate::token::ValidatedClaims;

const ENTITY: &str = "todo";

/// Largest page `list` will return; bigger limits are capped to it.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Offsets must fit the store's signed 64-bit integers.
const MAX_OFFSET: u64 = i64::MAX as u64;

fn checked_pagination(pagination: Pagination) -> WardenResult<Pagination> {
    if pagination.limit == 0 {
        return Err(WardenError::malformed("limit must be at least 1"));
    }
    if pagination.offset > MAX_OFFSET {
        return Err(WardenError::malformed("offset is out of range"));
    }
    Ok(Pagination {
        offset: pagination.offset,
        limit: pagination.limit.min(MAX_PAGE_SIZE),
    })
}

fn checked_title(title: &str) -> WardenResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(WardenError::malformed("title must not be empty"));
    }
    Ok(title.to_string())
}

pub struct TodoService<T: TodoRepository> {
    todos: T,
}

impl<T: TodoRepository> TodoService<T> {
    pub fn new(todos: T) -> Self {
        Self { todos }
    }

    /// Create a todo owned by the caller.
    pub async fn create(&self, identity: &ValidatedClaims, input: CreateTodo) -> WardenResult<Todo> {
        let input = CreateTodo {
            title: checked_title(&input.title)?,
            description: input.description,
        };

        let todo = self.todos.create(identity.subject_id(), input).await?;
        info!(todo_id = todo.id, owner_id = %todo.owner_id, "todo created");
        Ok(todo)
    }

    /// List the caller's own todos, at most [`MAX_PAGE_SIZE`] per page.
    pub async fn list(
        &self,
        identity: &ValidatedClaims,
        pagination: Pagination,
    ) -> WardenResult<PaginatedResult<Todo>> {
        let pagination = checked_pagination(pagination)?;
        self.todos
            .list_by_owner(identity.subject_id(), pagination)
            .await
    }

    pub async fn get(&self, identity: &ValidatedClaims, id: i64) -> WardenResult<Todo> {
        self.fetch_owned(identity, id).await
    }

    pub async fn update(
        &self,
        identity: &ValidatedClaims,
        id: i64,
        input: UpdateTodo,
    ) -> WardenResult<Todo> {
        if input.is_empty() {
            return Err(WardenError::malformed("nothing to update"));
        }
        let input = UpdateTodo {
            title: input.title.as_deref().map(checked_title).transpose()?,
            description: input.description,
        };

        let stored = self.fetch_owned(identity, id).await?;
        self.todos.update(id, &stored.owner_id, input).await
    }

    pub async fn delete(&self, identity: &ValidatedClaims, id: i64) -> WardenResult<Todo> {
        let stored = self.fetch_owned(identity, id).await?;
        let deleted = self.todos.delete(id, &stored.owner_id).await?;
        info!(todo_id = id, owner_id = %deleted.owner_id, "todo deleted");
        Ok(deleted)
    }

    async fn fetch_owned(&self, identity: &ValidatedClaims, id: i64) -> WardenResult<Todo> {
        let todo = self
            .todos
            .find_by_id(id)
            .await?
            .ok_or_else(|| WardenError::not_found(ENTITY, id))?;

        let decision = authorize_owner(identity, &todo.owner_id);
        if decision == AccessDecision::Deny {
            warn!(
                todo_id = id,
                principal_id = %identity.subject_id(),
                "access to todo denied"
            );
        }
        decision.into_result(ENTITY, id)?;

        Ok(todo)
    }
}
