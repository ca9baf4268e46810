//! SurrealDB implementation of [`PrincipalRepository`].
//!
//! Passwords arrive here already hashed by the auth layer; this
//! repository only persists and looks up the PHC string.

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::principal::{CreatePrincipal, Principal, UpdatePrincipal};
use warden_core::repository::PrincipalRepository;

use crate::error::DbError;

const COLUMNS: &str = "meta::id(id) AS record_id, email, display_name, password_hash";

/// DB-side row struct for queries where the id is already known.
#[derive(Debug, Deserialize)]
struct PrincipalRow {
    email: String,
    display_name: String,
    password_hash: String,
}

/// DB-side row struct that includes the record id via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct PrincipalRowWithId {
    record_id: String,
    email: String,
    display_name: String,
    password_hash: String,
}

impl PrincipalRow {
    fn into_principal(self, id: String) -> Principal {
        Principal {
            id,
            email: self.email,
            display_name: self.display_name,
            password_hash: self.password_hash,
        }
    }
}

impl From<PrincipalRowWithId> for Principal {
    fn from(row: PrincipalRowWithId) -> Self {
        Principal {
            id: row.record_id,
            email: row.email,
            display_name: row.display_name,
            password_hash: row.password_hash,
        }
    }
}

/// SurrealDB implementation of the Principal repository.
#[derive(Clone)]
pub struct SurrealPrincipalRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPrincipalRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PrincipalRepository for SurrealPrincipalRepository<C> {
    async fn create(&self, input: CreatePrincipal) -> WardenResult<Principal> {
        let id = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('principal', $id) SET \
                 email = $email, \
                 display_name = $display_name, \
                 password_hash = $password_hash",
            )
            .bind(("id", id.clone()))
            .bind(("email", input.email))
            .bind(("display_name", input.display_name))
            .bind(("password_hash", input.password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("principal", e))?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id.clone(),
        })?;

        Ok(row.into_principal(id))
    }

    async fn find_by_id(&self, id: &str) -> WardenResult<Option<Principal>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {COLUMNS} FROM type::thing('principal', $id)"
            ))
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(Principal::from))
    }

    async fn find_by_email(&self, email: &str) -> WardenResult<Option<Principal>> {
        let mut result = self
            .db
            .query(format!("SELECT {COLUMNS} FROM principal WHERE email = $email"))
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(Principal::from))
    }

    async fn update(&self, id: &str, input: UpdatePrincipal) -> WardenResult<Principal> {
        let mut sets = Vec::new();
        if input.display_name.is_some() {
            sets.push("display_name = $display_name");
        }
        if input.password_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::thing('principal', $id) SET {} RETURN AFTER",
            sets.join(", ")
        );

        let mut builder = self.db.query(query).bind(("id", id.to_string()));
        if let Some(display_name) = input.display_name {
            builder = builder.bind(("display_name", display_name));
        }
        if let Some(password_hash) = input.password_hash {
            builder = builder.bind(("password_hash", password_hash));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("principal", e))?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id.to_string(),
        })?;

        Ok(row.into_principal(id.to_string()))
    }
}
