//! Fetch, decode, extract and verify in one run

use crate::error::ProbeError;
use crate::proxy::{
    decode_lines, looks_base64, FetchResult, FetcherConfig, ListFetcher, ProxyCandidate,
    ProxyExtractor, ProxyVerifier, VerificationOutcome, VerifierConfig,
};
use crate::Result;
use reqwest::Client;
use tracing::{info, warn};

/// Configuration for a probe run
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub fetcher: FetcherConfig,
    /// Verification runs only when this is set
    pub verifier: Option<VerifierConfig>,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fetcher(mut self, fetcher: FetcherConfig) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_verification(mut self, verifier: VerifierConfig) -> Self {
        self.verifier = Some(verifier);
        self
    }
}

/// Hooks for reporting progress while the pipeline runs
///
/// Every method has an empty default so callers only implement what they show.
pub trait ProbeObserver: Send + Sync {
    fn on_fetched(&self, _result: &FetchResult) {}

    /// The list looks base64-encoded and is about to be decoded
    fn on_base64(&self) {}

    fn on_candidates(&self, _candidates: &[ProxyCandidate]) {}

    fn on_outcome(&self, _index: usize, _total: usize, _outcome: &VerificationOutcome) {}

    /// Fired once per run, when the first active proxy is found
    fn on_first_active(&self, _outcome: &VerificationOutcome) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProbeObserver for NoopObserver {}

/// What a successful run found
#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    /// Whether the list was base64-encoded
    pub base64: bool,
    pub candidates: Vec<ProxyCandidate>,
    /// Per-candidate results, in extraction order, when verification ran
    pub outcomes: Option<Vec<VerificationOutcome>>,
}

impl ProbeReport {
    pub fn found(&self) -> usize {
        self.candidates.len()
    }

    pub fn active_count(&self) -> Option<usize> {
        self.outcomes
            .as_ref()
            .map(|outcomes| outcomes.iter().filter(|o| o.is_active()).count())
    }

    pub fn active(&self) -> Vec<&VerificationOutcome> {
        self.outcomes
            .iter()
            .flatten()
            .filter(|o| o.is_active())
            .collect()
    }

    /// True when verification ran and no call ever reached the verifier
    pub fn verifier_unreachable(&self) -> bool {
        match &self.outcomes {
            Some(outcomes) => all_unreachable(outcomes),
            None => false,
        }
    }
}

fn all_unreachable(outcomes: &[VerificationOutcome]) -> bool {
    !outcomes.is_empty() && outcomes.iter().all(VerificationOutcome::is_unreachable)
}

/// Orchestrates a single probe run over one shared HTTP client
pub struct Pipeline {
    fetcher: ListFetcher,
    verifier: Option<ProxyVerifier>,
}

impl Pipeline {
    /// Create a pipeline with its own HTTP client
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.fetcher.user_agent)
            .build()
            .map_err(ProbeError::Client)?;

        Ok(Self::with_client(client, config))
    }

    /// Create a pipeline on top of an existing client
    pub fn with_client(client: Client, config: PipelineConfig) -> Self {
        let verifier = config
            .verifier
            .map(|verifier| ProxyVerifier::new(client.clone(), verifier));

        Self {
            fetcher: ListFetcher::new(client, config.fetcher),
            verifier,
        }
    }

    /// Create a pipeline from already built components
    pub fn from_parts(fetcher: ListFetcher, verifier: Option<ProxyVerifier>) -> Self {
        Self { fetcher, verifier }
    }

    pub fn verifies(&self) -> bool {
        self.verifier.is_some()
    }

    pub async fn run(&self, url: &str) -> Result<ProbeReport> {
        self.run_with(url, &NoopObserver).await
    }

    /// Run the whole pipeline, reporting progress to `observer`
    ///
    /// Fetch and decode failures abort the run, as does a list without any
    /// shadowsocks entries. Verification failures never do.
    pub async fn run_with(&self, url: &str, observer: &dyn ProbeObserver) -> Result<ProbeReport> {
        let fetched = self.fetcher.fetch(url).await?;
        observer.on_fetched(&fetched);

        let (base64, candidates) = extract_candidates(&fetched.body, observer)?;
        observer.on_candidates(&candidates);

        if candidates.is_empty() {
            warn!("No shadowsocks proxies found in {}", url);
            return Err(ProbeError::NoCandidates {
                url: url.to_string(),
            });
        }
        info!("Found {} shadowsocks proxies", candidates.len());

        let outcomes = match &self.verifier {
            Some(verifier) => Some(verify_all(verifier, &candidates, observer).await),
            None => None,
        };

        Ok(ProbeReport {
            base64,
            candidates,
            outcomes,
        })
    }
}

/// Decode the body if needed and pull out the candidates
///
/// Returns whether the body was treated as base64.
pub fn extract_candidates(
    body: &str,
    observer: &dyn ProbeObserver,
) -> Result<(bool, Vec<ProxyCandidate>)> {
    if looks_base64(body) {
        info!("The list appears to be base64 encoded, decoding");
        observer.on_base64();
        let lines = decode_lines(body)?;
        Ok((true, ProxyExtractor::extract(&lines)))
    } else {
        Ok((false, ProxyExtractor::extract_from_text(body)))
    }
}

/// Verify every candidate in order, one call at a time
pub async fn verify_all(
    verifier: &ProxyVerifier,
    candidates: &[ProxyCandidate],
    observer: &dyn ProbeObserver,
) -> Vec<VerificationOutcome> {
    let total = candidates.len();
    let mut active = 0usize;
    let mut outcomes = Vec::with_capacity(total);

    for (index, candidate) in candidates.iter().enumerate() {
        let outcome = verifier.verify(candidate).await;
        observer.on_outcome(index, total, &outcome);

        if outcome.is_active() {
            active += 1;
            if active == 1 {
                observer.on_first_active(&outcome);
            }
        }
        outcomes.push(outcome);
    }

    info!("{} of {} proxies are active", active, total);
    if all_unreachable(&outcomes) {
        warn!(
            "Verifier at {} could not be reached for any proxy",
            verifier.config().endpoint
        );
    }
    outcomes
}
