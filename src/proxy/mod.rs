//! Proxy module for acquiring and checking shadowsocks lists
//!
//! This module provides functionality for:
//! - Fetching raw proxy lists over HTTP
//! - Detecting and decoding base64-encoded lists
//! - Extracting `ss://` entries
//! - Verifying candidates one by one against a remote test service

pub mod checker;
pub mod encoding;
pub mod fetcher;
pub mod limiter;
pub mod models;
pub mod parser;

pub use checker::{ProxyVerifier, VerifierConfig, DEFAULT_VERIFIER_ENDPOINT};
pub use encoding::{decode_lines, looks_base64};
pub use fetcher::{FetcherConfig, ListFetcher};
pub use limiter::{RateLimit, SettleDelay, Unlimited};
pub use models::{
    FetchResult, ProxyCandidate, VerificationOutcome, VerificationStatus, SHADOWSOCKS_PREFIX,
};
pub use parser::ProxyExtractor;
