//! Thin async storage layer over sqlite + sqlx.
//!
//! Usage:
//! let db = Db::connect("sqlite::memory:").await?;
//! db.execute("CREATE TABLE ...").await?;
//! db.fetch_all("SELECT ...").await?
pub use futures::future::BoxFuture;
use log::{debug, info};
use sha2::{Digest, Sha256};
pub use sqlx::FromRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Executor, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

const MIGRATIONS_TABLE: &str = "__addressbook_migrations";

/// An async database pool wrapper.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

/// A registered schema migration, collected with `inventory`.
pub struct Migration(pub MigrationFn);

/// Migration function pointer for a model.
pub type MigrationFn = fn(Arc<Db>) -> BoxFuture<'static, Result<(), sqlx::Error>>;

impl std::ops::Deref for Migration {
    type Target = MigrationFn;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A table-backed record type whose schema can be created and extended in place.
#[async_trait::async_trait]
pub trait Model: Send + Sync {
    fn table_name() -> &'static str;
    fn create_table_sql() -> String;
    /// Column name and the SQL type used when adding it to an existing table.
    fn columns() -> Vec<(String, String)>;

    async fn migrate(db: Arc<Db>) -> Result<(), sqlx::Error> {
        let table_name = Self::table_name();
        let create_sql = Self::create_table_sql();
        let schema_hash = hash(&create_sql);

        ensure_migrations_table(&db).await?;

        let recorded: Option<(String,)> = sqlx::query_as(&format!(
            "SELECT hash FROM {MIGRATIONS_TABLE} WHERE table_name = ?"
        ))
        .bind(table_name)
        .fetch_optional(db.pool())
        .await?;

        let Some((recorded_hash,)) = recorded else {
            db.execute(&create_sql).await?;
            sqlx::query(&format!(
                "INSERT INTO {MIGRATIONS_TABLE} (table_name, schema_sql, hash) VALUES (?, ?, ?)"
            ))
            .bind(table_name)
            .bind(&create_sql)
            .bind(&schema_hash)
            .execute(db.pool())
            .await?;
            info!("Migrated `{}` (table created).", table_name);
            return Ok(());
        };

        if recorded_hash == schema_hash {
            info!("No schema changes detected for `{}`.", table_name);
            return Ok(());
        }

        let existing: Vec<String> = sqlx::query(&format!("PRAGMA table_info({table_name})"))
            .fetch_all(db.pool())
            .await?
            .into_iter()
            .map(|row: SqliteRow| row.get::<String, _>("name"))
            .collect();

        let mut added = Vec::new();
        for (name, sqltype) in Self::columns() {
            if !existing.contains(&name) {
                db.execute(&format!(
                    "ALTER TABLE {table_name} ADD COLUMN {name} {sqltype}"
                ))
                .await?;
                added.push((name, sqltype));
            }
        }

        for (name, sqltype) in &added {
            info!("Added column `{}.{}` {}", table_name, name, sqltype);
        }

        sqlx::query(&format!(
            "UPDATE {MIGRATIONS_TABLE} \
             SET schema_sql = ?, hash = ?, applied_at = CURRENT_TIMESTAMP \
             WHERE table_name = ?"
        ))
        .bind(&create_sql)
        .bind(&schema_hash)
        .bind(table_name)
        .execute(db.pool())
        .await?;
        Ok(())
    }
}

async fn ensure_migrations_table(db: &Db) -> Result<(), sqlx::Error> {
    db.execute(&format!(
        "CREATE TABLE IF NOT EXISTS {MIGRATIONS_TABLE} (
            table_name TEXT PRIMARY KEY,
            schema_sql TEXT NOT NULL,
            hash TEXT NOT NULL,
            applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )"
    ))
    .await
}

fn hash(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl Db {
    /// Connect to (or create) a SQLite database at the given URI.
    ///
    /// In-memory databases are private to a connection, so they get a
    /// single-connection pool.
    pub async fn connect(uri: &str) -> Result<Self, sqlx::Error> {
        info!("Connecting to SQLite database at URI: {}", uri);
        let options = SqliteConnectOptions::from_str(uri)?.create_if_missing(true);
        let max_connections = if uri.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        info!("Connected to SQLite database: {}", uri);
        Ok(Db { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Execute an arbitrary SQL statement, e.g. DDL.
    pub async fn execute(&self, sql: &str) -> Result<(), sqlx::Error> {
        debug!("Executing SQL: {}", sql);
        let result = self.pool.execute(sql).await;
        if let Err(e) = &result {
            log::error!("SQL execution failed: {}", e);
        }
        result.map(|_| ())
    }

    /// Fetch all rows and map to a type implementing `FromRow`.
    pub async fn fetch_all<T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin>(
        &self,
        sql: &str,
    ) -> Result<Vec<T>, sqlx::Error> {
        debug!("Fetching rows with SQL: {}", sql);
        let result = sqlx::query_as(sql).fetch_all(&self.pool).await;
        match &result {
            Ok(rows) => debug!("Fetched {} rows", rows.len()),
            Err(e) => log::error!("Row fetch failed: {}", e),
        }
        result
    }
}

/// Migrate all registered models.
pub async fn auto_migrate(db: Arc<Db>) -> Result<(), sqlx::Error> {
    info!("Starting auto migration of all registered models...");
    let mut total = 0;
    for m in inventory::iter::<Migration> {
        total += 1;
        if let Err(e) = m(db.clone()).await {
            log::error!("Auto-migration failed for a model: {}", e);
            return Err(e);
        }
    }
    info!("Auto migration completed for {} models.", total);
    Ok(())
}
