//! SurrealDB implementation of [`TodoRepository`].
//!
//! Todo ids are sequential integers. Mutations are conditioned on the
//! stored `owner_id` so that the ownership check done by the caller and
//! the write itself cannot be separated by a concurrent reassignment
//! or delete.

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use warden_core::error::WardenResult;
use warden_core::models::todo::{CreateTodo, Todo, UpdateTodo};
use warden_core::repository::{PaginatedResult, Pagination, TodoRepository};

use crate::error::DbError;

#[derive(Debug, Deserialize)]
struct TodoRow {
    owner_id: String,
    title: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct TodoRowWithId {
    record_id: i64,
    owner_id: String,
    title: String,
    description: String,
}

impl TodoRow {
    fn into_todo(self, id: i64) -> Todo {
        Todo {
            id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
        }
    }
}

impl From<TodoRowWithId> for Todo {
    fn from(row: TodoRowWithId) -> Self {
        Todo {
            id: row.record_id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SequenceRow {
    last_value: i64,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

fn not_found(id: i64) -> DbError {
    DbError::NotFound {
        entity: "todo".into(),
        id: id.to_string(),
    }
}

/// SurrealDB implementation of the Todo repository.
#[derive(Clone)]
pub struct SurrealTodoRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTodoRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Bump the `todo` sequence record and return the new value.
    ///
    /// A single-record UPSERT is atomic, so concurrent creators never
    /// receive the same id.
    async fn next_id(&self) -> Result<i64, DbError> {
        let result = self
            .db
            .query(
                "UPSERT type::thing('id_sequence', 'todo') SET \
                 last_value = (last_value OR 0) + 1 \
                 RETURN AFTER",
            )
            .await?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<SequenceRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(|r| r.last_value)
            .ok_or_else(|| DbError::Query("id sequence returned no value".into()))
    }
}

impl<C: Connection> TodoRepository for SurrealTodoRepository<C> {
    async fn create(&self, owner_id: &str, input: CreateTodo) -> WardenResult<Todo> {
        let id = self.next_id().await?;

        let result = self
            .db
            .query(
                "CREATE type::thing('todo', $id) SET \
                 owner_id = $owner_id, \
                 title = $title, \
                 description = $description",
            )
            .bind(("id", id))
            .bind(("owner_id", owner_id.to_string()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("todo", e))?;

        let rows: Vec<TodoRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id))?;

        Ok(row.into_todo(id))
    }

    async fn find_by_id(&self, id: i64) -> WardenResult<Option<Todo>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, owner_id, title, description \
                 FROM type::thing('todo', $id)",
            )
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TodoRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(Todo::from))
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        pagination: Pagination,
    ) -> WardenResult<PaginatedResult<Todo>> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM todo \
                 WHERE owner_id = $owner_id GROUP ALL",
            )
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT id, meta::id(id) AS record_id, owner_id, title, description \
                 FROM todo \
                 WHERE owner_id = $owner_id \
                 ORDER BY id ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("owner_id", owner_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TodoRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(PaginatedResult {
            items: rows.into_iter().map(Todo::from).collect(),
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn update(&self, id: i64, owner_id: &str, input: UpdateTodo) -> WardenResult<Todo> {
        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::thing('todo', $id) SET {} \
             WHERE owner_id = $owner_id RETURN AFTER",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("id", id))
            .bind(("owner_id", owner_id.to_string()));
        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("todo", e))?;

        // No row back means the record is gone or no longer belongs to
        // `owner_id`.
        let rows: Vec<TodoRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id))?;

        Ok(row.into_todo(id))
    }

    async fn delete(&self, id: i64, owner_id: &str) -> WardenResult<Todo> {
        let result = self
            .db
            .query(
                "DELETE type::thing('todo', $id) \
                 WHERE owner_id = $owner_id RETURN BEFORE",
            )
            .bind(("id", id))
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("todo", e))?;

        let rows: Vec<TodoRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(id))?;

        Ok(row.into_todo(id))
    }
}
