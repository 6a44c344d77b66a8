//! Lazy seeding of the contact store from an external user list.
//!
//! `ContactService::get_all_contacts` returns the stored contacts when there
//! are any. Against an empty store it pulls the external list once, inserts
//! every user in order (duplicate emails are skipped by the store's unique
//! constraint) and returns the re-read, name-sorted table.
use crate::contacts::{Address, Company, Contact, ContactStore, InsertOutcome, NewContact};
use crate::error::{FetchError, LoadError};
use log::{info, warn};
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_COMPANY_NAME: &str = "Self-employed";
const DEFAULT_CATCH_PHRASE: &str = "Building the future";
const UNKNOWN: &str = "Unknown";
const DEFAULT_ZIPCODE: &str = "00000";

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalUserList {
    pub users: Vec<ExternalUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub company: Option<ExternalCompany>,
    #[serde(default)]
    pub address: Option<ExternalAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalCompany {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalAddress {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

/// Present and non-empty, or the fallback.
fn or_default(value: Option<&String>, fallback: impl FnOnce() -> String) -> String {
    match value {
        Some(v) if !v.is_empty() => v.clone(),
        _ => fallback(),
    }
}

impl From<&ExternalUser> for NewContact {
    fn from(user: &ExternalUser) -> Self {
        let company = user.company.as_ref();
        let address = user.address.as_ref();

        NewContact {
            name: format!("{} {}", user.first_name, user.last_name),
            email: user.email.clone(),
            phone: user.phone.clone(),
            website: or_default(user.domain.as_ref(), || {
                format!("{}.com", user.first_name.to_lowercase())
            }),
            company: Company {
                name: or_default(company.and_then(|c| c.name.as_ref()), || {
                    DEFAULT_COMPANY_NAME.to_string()
                }),
                catch_phrase: or_default(company.and_then(|c| c.title.as_ref()), || {
                    DEFAULT_CATCH_PHRASE.to_string()
                }),
            },
            address: Address {
                street: or_default(address.and_then(|a| a.address.as_ref()), || {
                    UNKNOWN.to_string()
                }),
                city: or_default(address.and_then(|a| a.city.as_ref()), || {
                    UNKNOWN.to_string()
                }),
                zipcode: or_default(address.and_then(|a| a.postal_code.as_ref()), || {
                    DEFAULT_ZIPCODE.to_string()
                }),
            },
        }
    }
}

/// Where seed users come from.
#[async_trait::async_trait]
pub trait UserSource: Send + Sync {
    async fn fetch_users(&self) -> Result<Vec<ExternalUser>, FetchError>;
}

/// Fetches seed users with a single unconditioned GET.
pub struct HttpUserSource {
    client: reqwest::Client,
    url: String,
}

impl HttpUserSource {
    pub fn new(url: impl Into<String>) -> Self {
        HttpUserSource {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl UserSource for HttpUserSource {
    async fn fetch_users(&self) -> Result<Vec<ExternalUser>, FetchError> {
        info!("Fetching seed users from {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body: ExternalUserList = response.json().await?;
        Ok(body.users)
    }
}

/// Outcome counts of one seeding pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped_duplicates: usize,
    pub failed: usize,
}

pub struct ContactService {
    store: ContactStore,
    source: Arc<dyn UserSource>,
}

impl ContactService {
    pub fn new(store: ContactStore, source: Arc<dyn UserSource>) -> Self {
        ContactService { store, source }
    }

    pub fn store(&self) -> &ContactStore {
        &self.store
    }

    /// All contacts sorted by name, seeding the store first if it is empty.
    pub async fn get_all_contacts(&self) -> Result<Vec<Contact>, LoadError> {
        let contacts = self.store.all_sorted().await?;
        if !contacts.is_empty() {
            return Ok(contacts);
        }

        info!("Contact store is empty, seeding");
        let users = self.source.fetch_users().await?;
        let report = self.seed(&users).await;
        info!(
            "Seeding finished: {} inserted, {} duplicates skipped, {} failed",
            report.inserted, report.skipped_duplicates, report.failed
        );

        Ok(self.store.all_sorted().await?)
    }

    /// Insert every user in order. Nothing here aborts the pass: duplicates
    /// are counted as skipped, other insert failures are logged and counted.
    pub async fn seed(&self, users: &[ExternalUser]) -> SeedReport {
        let mut report = SeedReport::default();
        for user in users {
            let contact = NewContact::from(user);
            match self.store.insert(&contact).await {
                Ok(InsertOutcome::Inserted(_)) => report.inserted += 1,
                Ok(InsertOutcome::ConflictSkipped) => report.skipped_duplicates += 1,
                Err(e) => {
                    warn!("Failed to insert user {}: {}", contact.email, e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}
