//! The contact record, its table, and the store that reads and inserts it.
use crate::orm::{BoxFuture, Db, FromRow, Migration, Model};
use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub catch_phrase: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zipcode: String,
}

/// A contact as delivered to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub company: Company,
    pub address: Address,
}

/// A contact ready to be inserted; the store assigns `id` and `created_at`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub company: Company,
    pub address: Address,
}

/// Flat row of the `users` table.
#[derive(Debug, FromRow)]
pub struct ContactRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub company_name: String,
    pub company_catch_phrase: String,
    pub address_street: String,
    pub address_city: String,
    pub address_zipcode: String,
    pub created_at: NaiveDateTime,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            website: row.website,
            company: Company {
                name: row.company_name,
                catch_phrase: row.company_catch_phrase,
            },
            address: Address {
                street: row.address_street,
                city: row.address_city,
                zipcode: row.address_zipcode,
            },
        }
    }
}

/// Column name, type in CREATE TABLE, type when added to an existing table.
/// SQLite cannot add UNIQUE columns or non-constant defaults via ALTER TABLE.
const COLUMNS: &[(&str, &str, &str)] = &[
    ("name", "TEXT NOT NULL", "TEXT NOT NULL DEFAULT ''"),
    ("email", "TEXT NOT NULL UNIQUE", "TEXT NOT NULL DEFAULT ''"),
    ("phone", "TEXT NOT NULL", "TEXT NOT NULL DEFAULT ''"),
    ("website", "TEXT NOT NULL", "TEXT NOT NULL DEFAULT ''"),
    ("company_name", "TEXT NOT NULL", "TEXT NOT NULL DEFAULT ''"),
    ("company_catch_phrase", "TEXT NOT NULL", "TEXT NOT NULL DEFAULT ''"),
    ("address_street", "TEXT NOT NULL", "TEXT NOT NULL DEFAULT ''"),
    ("address_city", "TEXT NOT NULL", "TEXT NOT NULL DEFAULT ''"),
    ("address_zipcode", "TEXT NOT NULL", "TEXT NOT NULL DEFAULT ''"),
    (
        "created_at",
        "DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP",
        "DATETIME NOT NULL DEFAULT '1970-01-01 00:00:00'",
    ),
];

impl Model for ContactRow {
    fn table_name() -> &'static str {
        "users"
    }

    fn create_table_sql() -> String {
        let columns: Vec<String> = COLUMNS
            .iter()
            .map(|(name, sqltype, _)| format!("{name} {sqltype}"))
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY AUTOINCREMENT, {})",
            Self::table_name(),
            columns.join(", ")
        )
    }

    fn columns() -> Vec<(String, String)> {
        COLUMNS
            .iter()
            .map(|(name, _, added)| (name.to_string(), added.to_string()))
            .collect()
    }
}

fn migrate_contacts(db: Arc<Db>) -> BoxFuture<'static, Result<(), sqlx::Error>> {
    Box::pin(async move { ContactRow::migrate(db).await })
}

inventory::submit! {
    Migration(migrate_contacts)
}

/// Result of a single insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(i64),
    /// The store already holds a contact with this email.
    ConflictSkipped,
}

/// Reads and inserts contacts in the `users` table.
#[derive(Clone)]
pub struct ContactStore {
    db: Arc<Db>,
}

impl ContactStore {
    pub fn new(db: Arc<Db>) -> Self {
        ContactStore { db }
    }

    /// Every contact, ascending by name (binary collation), ties by id.
    pub async fn all_sorted(&self) -> Result<Vec<Contact>, sqlx::Error> {
        let rows: Vec<ContactRow> = self
            .db
            .fetch_all("SELECT * FROM users ORDER BY name ASC, id ASC")
            .await?;
        Ok(rows.into_iter().map(Contact::from).collect())
    }

    /// Insert one contact. A unique-constraint violation is reported as
    /// [`InsertOutcome::ConflictSkipped`], not as an error.
    pub async fn insert(&self, contact: &NewContact) -> Result<InsertOutcome, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, phone, website, company_name, \
             company_catch_phrase, address_street, address_city, address_zipcode) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.website)
        .bind(&contact.company.name)
        .bind(&contact.company.catch_phrase)
        .bind(&contact.address.street)
        .bind(&contact.address.city)
        .bind(&contact.address.zipcode)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(done) => Ok(InsertOutcome::Inserted(done.last_insert_rowid())),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                debug!("Skipping duplicate user: {}", contact.email);
                Ok(InsertOutcome::ConflictSkipped)
            }
            Err(e) => Err(e),
        }
    }
}
