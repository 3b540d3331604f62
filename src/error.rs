//! Error types for the probe pipeline

use thiserror::Error;

/// Fatal errors that abort a probe run.
///
/// Per-candidate verification failures are not represented here; they are
/// folded into [`crate::proxy::VerificationStatus`] and never stop the run.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The list URL could not be reached (DNS, connection refused, timeout, ...)
    #[error("failed to fetch the list from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The list URL answered with something other than 200
    #[error("failed to fetch the list from {url}: HTTP status {status}")]
    FetchStatus { url: String, status: u16 },

    /// Base64 content that does not decode, or decodes to invalid UTF-8
    #[error("failed to decode the list: {0}")]
    Decode(String),

    #[error("no shadowsocks proxies found in {url}")]
    NoCandidates { url: String },

    /// The shared HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
