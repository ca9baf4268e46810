//! Schema migrations against the in-memory engine.

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

#[derive(Debug, Deserialize)]
struct Applied {
    version: u32,
    name: String,
}

async fn fresh_db() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("schema").use_db("schema").await.unwrap();
    db
}

#[tokio::test]
async fn defines_every_table() {
    let db = fresh_db().await;
    warden_db::run_migrations(&db).await.unwrap();

    let mut response = db.query("INFO FOR DB").await.unwrap();
    let info: surrealdb::Value = response.take(0).unwrap();
    let rendered = format!("{info:?}");

    for table in ["principal", "todo", "id_sequence", "_migration"] {
        assert!(rendered.contains(table), "{table} is not defined");
    }
}

#[tokio::test]
async fn rerunning_records_the_version_once() {
    let db = fresh_db().await;
    warden_db::run_migrations(&db).await.unwrap();
    warden_db::run_migrations(&db).await.unwrap();

    let mut response = db
        .query("SELECT version, name FROM _migration")
        .await
        .unwrap();
    let applied: Vec<Applied> = response.take(0).unwrap();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].version, 1);
    assert_eq!(applied[0].name, "initial_schema");
}

#[tokio::test]
async fn principal_email_must_look_like_an_email() {
    let db = fresh_db().await;
    warden_db::run_migrations(&db).await.unwrap();

    let outcome = db
        .query(
            "CREATE principal SET email = 'not-an-email', \
             display_name = 'x', password_hash = 'y'",
        )
        .await
        .unwrap()
        .check();
    assert!(outcome.is_err());
}

#[tokio::test]
async fn principal_email_is_unique_in_the_store() {
    let db = fresh_db().await;
    warden_db::run_migrations(&db).await.unwrap();

    let insert = "CREATE principal SET email = 'a@x.com', \
                  display_name = 'x', password_hash = 'y'";
    db.query(insert).await.unwrap().check().unwrap();

    let err = db.query(insert).await.unwrap().check().unwrap_err();
    assert!(err.to_string().contains("already contains"), "{err}");
}
