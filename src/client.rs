//! Client for the `users.getAll` query. Retries with exponential backoff are
//! handled by the HTTP client's retry middleware.
use crate::app::{QueryFailure, QueryResult, USERS_GET_ALL_PATH};
use crate::contacts::Contact;
use crate::error::ClientError;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::{Jitter, RetryTransientMiddleware};
use std::time::Duration;

/// Retry schedule: delay before retry `n` (0-based) is `min(base * 2^n, cap)`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base: Duration,
    pub cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            base: Duration::from_secs(1),
            cap: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            ..Default::default()
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::builder()
            .retry_bounds(self.base, self.cap)
            .jitter(Jitter::None)
            .base(2)
            .build_with_max_retries(self.max_retries)
    }

    /// reqwest client that retries transient failures (connect errors,
    /// timeouts, 408, 429, 5xx) on this schedule.
    fn http_client(&self) -> ClientWithMiddleware {
        ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(self.backoff()))
            .build()
    }
}

pub struct AddressBookClient {
    http: ClientWithMiddleware,
    base_url: String,
}

impl AddressBookClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        AddressBookClient {
            http: RetryPolicy::default().http_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.http = retry.http_client();
        self
    }

    /// Fetch every contact. Transient failures are retried by the client;
    /// the last response decides the outcome.
    pub async fn get_all(&self) -> Result<Vec<Contact>, ClientError> {
        let url = format!("{}{}", self.base_url, USERS_GET_ALL_PATH);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(reqwest_middleware::Error::from)?;

        if status.is_success() {
            let envelope: QueryResult<Vec<Contact>> = serde_json::from_str(&body)?;
            return Ok(envelope.result.data);
        }
        log::warn!("users.getAll failed with HTTP {}", status.as_u16());
        match serde_json::from_str::<QueryFailure>(&body) {
            Ok(failure) => Err(ClientError::Server(failure.error.message)),
            Err(_) => Err(ClientError::Status(status.as_u16())),
        }
    }
}
