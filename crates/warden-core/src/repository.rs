//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups that may legitimately
//! miss return `Option`; mutations keyed by id fail with
//! [`WardenError::NotFound`](crate::error::WardenError::NotFound) when
//! the target record is gone.

use serde::Serialize;

use crate::error::WardenResult;
use crate::models::{
    principal::{CreatePrincipal, Principal, UpdatePrincipal},
    todo::{CreateTodo, Todo, UpdateTodo},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait PrincipalRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the email is taken.
    fn create(
        &self,
        input: CreatePrincipal,
    ) -> impl Future<Output = WardenResult<Principal>> + Send;
    fn find_by_id(&self, id: &str) -> impl Future<Output = WardenResult<Option<Principal>>> + Send;
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = WardenResult<Option<Principal>>> + Send;
    fn update(
        &self,
        id: &str,
        input: UpdatePrincipal,
    ) -> impl Future<Output = WardenResult<Principal>> + Send;
}

pub trait TodoRepository: Send + Sync {
    /// Allocate the next id and store a todo owned by `owner_id`.
    fn create(
        &self,
        owner_id: &str,
        input: CreateTodo,
    ) -> impl Future<Output = WardenResult<Todo>> + Send;
    fn find_by_id(&self, id: i64) -> impl Future<Output = WardenResult<Option<Todo>>> + Send;
    fn list_by_owner(
        &self,
        owner_id: &str,
        pagination: Pagination,
    ) -> impl Future<Output = WardenResult<PaginatedResult<Todo>>> + Send;

    /// Apply `input` only if the record still exists and is still owned
    /// by `owner_id`; otherwise `NotFound`.
    fn update(
        &self,
        id: i64,
        owner_id: &str,
        input: UpdateTodo,
    ) -> impl Future<Output = WardenResult<Todo>> + Send;

    /// Delete only if the record still exists and is still owned by
    /// `owner_id`; returns the deleted record, otherwise `NotFound`.
    fn delete(&self, id: i64, owner_id: &str) -> impl Future<Output = WardenResult<Todo>> + Send;
}
