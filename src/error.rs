use thiserror::Error;

/// The only failure text callers ever see from a contact load.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load users. Please try again.";

/// Failure while pulling seed users from the external source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to user source failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("user source responded with HTTP {0}")]
    Status(u16),
}

/// Failure of `get_all_contacts`. Both variants collapse to
/// [`LOAD_FAILED_MESSAGE`] at the HTTP boundary.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch seed users: {0}")]
    Fetch(#[from] FetchError),
    #[error("contact store failure: {0}")]
    Store(#[from] sqlx::Error),
}

impl LoadError {
    pub fn public_message(&self) -> &'static str {
        LOAD_FAILED_MESSAGE
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid configuration: {0}")]
    Config(#[from] figment::Error),
}

/// Failure of [`crate::client::AddressBookClient`] after retries are exhausted.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest_middleware::Error),
    #[error("server responded with HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Server(String),
}
