use addressbook::contacts::ContactRow;
use addressbook::orm::{Db, Model, auto_migrate};
use sqlx::FromRow;
use std::sync::Arc;

#[tokio::test]
async fn test_db_basic_crud() {
    #[derive(Debug, FromRow, PartialEq, Eq)]
    struct Person {
        name: String,
    }

    let db = Db::connect("sqlite::memory:").await.unwrap();
    db.execute("CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT)")
        .await
        .unwrap();
    db.execute("INSERT INTO person (name) VALUES ('Alice')")
        .await
        .unwrap();

    let people: Vec<Person> = db.fetch_all("SELECT name FROM person").await.unwrap();
    assert_eq!(people, vec![Person { name: "Alice".into() }]);
}

#[tokio::test]
async fn test_execute_reports_errors() {
    let db = Db::connect("sqlite::memory:").await.unwrap();
    assert!(db.execute("SELECT * FROM no_such_table").await.is_err());
}

#[tokio::test]
async fn test_migrate_creates_table_once() {
    let db = Arc::new(Db::connect("sqlite::memory:").await.unwrap());
    ContactRow::migrate(db.clone()).await.unwrap();
    ContactRow::migrate(db.clone()).await.unwrap();

    let recorded: Vec<(String,)> = db
        .fetch_all("SELECT table_name FROM __addressbook_migrations")
        .await
        .unwrap();
    assert_eq!(recorded, vec![("users".to_string(),)]);
    let users: Vec<(i64,)> = db.fetch_all("SELECT id FROM users").await.unwrap();
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_migrate_adds_missing_columns() {
    let db = Arc::new(Db::connect("sqlite::memory:").await.unwrap());
    db.execute(
        "CREATE TABLE __addressbook_migrations (
            table_name TEXT PRIMARY KEY,
            schema_sql TEXT NOT NULL,
            hash TEXT NOT NULL,
            applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .await
    .unwrap();
    db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL DEFAULT '')")
        .await
        .unwrap();
    db.execute(
        "INSERT INTO __addressbook_migrations (table_name, schema_sql, hash) VALUES ('users', 'old', 'stale')",
    )
    .await
    .unwrap();

    ContactRow::migrate(db.clone()).await.unwrap();

    let columns: Vec<(String,)> = db
        .fetch_all("SELECT name FROM pragma_table_info('users')")
        .await
        .unwrap();
    let names: Vec<String> = columns.into_iter().map(|(n,)| n).collect();
    assert!(names.contains(&"company_catch_phrase".to_string()));
    assert!(names.contains(&"address_zipcode".to_string()));
}

#[tokio::test]
async fn test_auto_migrate_runs() {
    let db = Arc::new(Db::connect("sqlite::memory:").await.unwrap());
    auto_migrate(db).await.unwrap();
}
