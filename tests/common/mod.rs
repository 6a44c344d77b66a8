#![allow(dead_code)]

use addressbook::contacts::{ContactRow, ContactStore};
use addressbook::error::FetchError;
use addressbook::orm::{Db, Model};
use addressbook::seed::{ContactService, ExternalCompany, ExternalUser, UserSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory user source that counts how often it is asked.
pub struct FakeSource {
    pub users: Vec<ExternalUser>,
    fail_with: Option<u16>,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn returning(users: Vec<ExternalUser>) -> Arc<Self> {
        Arc::new(FakeSource {
            users,
            fail_with: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(FakeSource {
            users: Vec::new(),
            fail_with: Some(status),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl UserSource for FakeSource {
    async fn fetch_users(&self) -> Result<Vec<ExternalUser>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with {
            Some(status) => Err(FetchError::Status(status)),
            None => Ok(self.users.clone()),
        }
    }
}

pub fn user(first: &str, last: &str, email: &str) -> ExternalUser {
    ExternalUser {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        phone: "+1 555 0100".to_string(),
        ..Default::default()
    }
}

pub fn user_at(first: &str, last: &str, email: &str, company: &str) -> ExternalUser {
    ExternalUser {
        company: Some(ExternalCompany {
            name: Some(company.to_string()),
            title: Some("Engineer".to_string()),
        }),
        ..user(first, last, email)
    }
}

pub async fn memory_db() -> Arc<Db> {
    let db = Arc::new(Db::connect("sqlite::memory:").await.unwrap());
    ContactRow::migrate(db.clone()).await.unwrap();
    db
}

pub async fn memory_store() -> ContactStore {
    ContactStore::new(memory_db().await)
}

pub async fn service_with(source: Arc<FakeSource>) -> ContactService {
    ContactService::new(memory_store().await, source)
}
