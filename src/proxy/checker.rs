//! Proxy verifier backed by a remote test service

use crate::proxy::limiter::{limiter_for, RateLimit};
use crate::proxy::models::{ProxyCandidate, VerificationOutcome};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default timeout for one verification call in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default pause between consecutive verification calls in milliseconds
const DEFAULT_SETTLE_DELAY_MS: u64 = 200;

/// Public verifier instance used when none is given
pub const DEFAULT_VERIFIER_ENDPOINT: &str = "https://verifier.ss-probe.example";

/// Path of the test route on the verifier
const TEST_PATH: &str = "/v2/test";

/// Configuration for the proxy verifier
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Base URL of the verification service
    pub endpoint: String,
    /// Upper bound for a single verification call
    pub timeout: Duration,
    /// Minimum spacing between verification calls
    pub settle_delay: Duration,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_VERIFIER_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
        }
    }
}

impl VerifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Full URL of the test route
    pub fn test_url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), TEST_PATH)
    }
}

#[derive(Debug, Serialize)]
struct TestRequest<'a> {
    address: &'a str,
}

#[derive(Debug, Deserialize)]
struct TestResponse {
    /// IP address the service observed when connecting through the proxy
    #[serde(default)]
    ip: Option<String>,
}

/// Checks candidates one at a time against the verification service
pub struct ProxyVerifier {
    config: VerifierConfig,
    client: Client,
    limiter: Arc<dyn RateLimit>,
}

impl ProxyVerifier {
    /// Create a verifier paced by the configured settle delay
    pub fn new(client: Client, config: VerifierConfig) -> Self {
        let limiter = limiter_for(config.settle_delay);
        Self::with_limiter(client, config, limiter)
    }

    /// Create a verifier with an explicit limiter
    pub fn with_limiter(client: Client, config: VerifierConfig, limiter: Arc<dyn RateLimit>) -> Self {
        Self {
            config,
            client,
            limiter,
        }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify a single candidate
    ///
    /// Never fails: every error is reported as an inactive outcome.
    pub async fn verify(&self, candidate: &ProxyCandidate) -> VerificationOutcome {
        self.limiter.until_ready().await;

        let start = Instant::now();
        let outcome = match tokio::time::timeout(self.config.timeout, self.request(candidate)).await
        {
            Ok(Ok(ip)) => {
                let elapsed = start.elapsed().as_millis() as u64;
                VerificationOutcome::active(candidate.clone(), ip, elapsed)
            }
            Ok(Err(outcome)) => outcome,
            Err(_) => VerificationOutcome::timeout(candidate.clone()),
        };

        debug!("Verified {}: {:?}", candidate, outcome.status);
        outcome
    }

    /// Ask the service to test the candidate, returning the observed IP
    async fn request(
        &self,
        candidate: &ProxyCandidate,
    ) -> std::result::Result<String, VerificationOutcome> {
        let failed = |reason: String| VerificationOutcome::inactive(candidate.clone(), reason);

        let response = self
            .client
            .post(self.config.test_url())
            .timeout(self.config.timeout)
            .json(&TestRequest {
                address: candidate.as_str(),
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VerificationOutcome::timeout(candidate.clone())
                } else if e.is_connect() {
                    VerificationOutcome::unreachable(candidate.clone(), e.to_string())
                } else {
                    failed(e.to_string())
                }
            })?;

        if response.status() != StatusCode::OK {
            return Err(failed(format!("HTTP status: {}", response.status())));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                VerificationOutcome::timeout(candidate.clone())
            } else {
                failed(e.to_string())
            }
        })?;

        let parsed: TestResponse = serde_json::from_slice(&body)
            .map_err(|e| failed(format!("malformed response: {}", e)))?;

        match parsed.ip {
            Some(ip) if !ip.is_empty() => Ok(ip),
            _ => Err(failed("response has no observed IP".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::limiter::Unlimited;

    #[test]
    fn test_verifier_config_default() {
        let config = VerifierConfig::default();
        assert_eq!(config.endpoint, DEFAULT_VERIFIER_ENDPOINT);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.settle_delay, Duration::from_millis(DEFAULT_SETTLE_DELAY_MS));
    }

    #[test]
    fn test_verifier_config_builder() {
        let config = VerifierConfig::new()
            .with_endpoint("http://localhost:9000".to_string())
            .with_timeout(Duration::from_secs(3))
            .with_settle_delay(Duration::ZERO);

        assert_eq!(config.endpoint, "http://localhost:9000");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.settle_delay, Duration::ZERO);
    }

    #[test]
    fn test_test_url() {
        let config = VerifierConfig::new().with_endpoint("http://localhost:9000".to_string());
        assert_eq!(config.test_url(), "http://localhost:9000/v2/test");

        let config = VerifierConfig::new().with_endpoint("http://localhost:9000/".to_string());
        assert_eq!(config.test_url(), "http://localhost:9000/v2/test");
    }

    #[test]
    fn test_response_field_parsing() {
        let parsed: TestResponse = serde_json::from_str(r#"{"ip":"1.2.3.4","port":1}"#).unwrap();
        assert_eq!(parsed.ip.as_deref(), Some("1.2.3.4"));

        let parsed: TestResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.ip.is_none());
    }

    #[tokio::test]
    async fn test_verify_unreachable_endpoint_is_inactive() {
        let config = VerifierConfig::new()
            .with_endpoint("http://127.0.0.1:1".to_string())
            .with_timeout(Duration::from_secs(2));
        let verifier = ProxyVerifier::with_limiter(Client::new(), config, Arc::new(Unlimited));

        let candidate = ProxyCandidate::from_line("ss://abc").unwrap();
        let outcome = verifier.verify(&candidate).await;
        assert!(!outcome.is_active());
        assert!(outcome.is_unreachable());
        assert_eq!(outcome.candidate, candidate);
    }
}
