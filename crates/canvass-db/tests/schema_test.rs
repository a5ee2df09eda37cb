//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn fresh_db() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    db
}

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = fresh_db().await;
    canvass_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in ["tenant", "user", "admin", "dropdown_option", "setting", "_migration"] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = fresh_db().await;

    canvass_db::run_migrations(&db).await.unwrap();
    canvass_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 2, "expected one record per migration");
}

#[tokio::test]
async fn status_assertion_rejects_unknown_values() {
    let db = fresh_db().await;
    canvass_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE user SET tenant_id = 't', public_id = 'p', \
             email = 'a@example.com', name = 'A', \
             status = 'Locked', password_hash = 'x'",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "unknown status should be rejected");
}

#[tokio::test]
async fn unique_index_scopes_emails_per_tenant() {
    let db = fresh_db().await;
    canvass_db::run_migrations(&db).await.unwrap();

    let insert = |tenant: &'static str| {
        let db = db.clone();
        async move {
            db.query(
                "CREATE user SET tenant_id = $tenant, public_id = rand::string(12), \
                 email = 'dup@example.com', name = 'Dup', \
                 status = 'Pending', password_hash = 'x'",
            )
            .bind(("tenant", tenant))
            .await
            .unwrap()
            .check()
        }
    };

    assert!(insert("tenant-a").await.is_ok());
    assert!(insert("tenant-b").await.is_ok(), "other tenant may reuse email");
    assert!(insert("tenant-a").await.is_err(), "duplicate email must be rejected");
}
