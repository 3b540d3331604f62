//! List fetcher for downloading raw proxy lists

use crate::error::ProbeError;
use crate::proxy::models::FetchResult;
use crate::Result;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for list downloads in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("ss-probe/", env!("CARGO_PKG_VERSION"));

/// Configuration for the list fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Timeout for the list download
    pub timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Downloads a proxy list over HTTP
pub struct ListFetcher {
    config: FetcherConfig,
    client: Client,
}

impl ListFetcher {
    /// Create a fetcher on top of a shared client
    pub fn new(client: Client, config: FetcherConfig) -> Self {
        Self { config, client }
    }

    /// Fetch the raw list body
    ///
    /// Anything other than a 200 response is an error, as is a request that
    /// never completes. No retries.
    pub async fn fetch(&self, url: &str) -> Result<FetchResult> {
        info!("Fetching proxy list from {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|source| ProbeError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        debug!("List endpoint answered with status {}", status);

        if status != 200 {
            return Err(ProbeError::FetchStatus {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| ProbeError::Fetch {
            url: url.to_string(),
            source,
        })?;
        debug!("Fetched {} bytes", body.len());

        Ok(FetchResult::new(status, body))
    }
}
