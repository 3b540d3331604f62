//! Proxy data models

use std::fmt;

/// Protocol prefix that marks a shadowsocks entry
pub const SHADOWSOCKS_PREFIX: &str = "ss://";

/// A single list entry that starts with the shadowsocks prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCandidate(String);

impl ProxyCandidate {
    /// Wrap a line if it is a shadowsocks entry
    pub fn from_line(line: &str) -> Option<Self> {
        if line.starts_with(SHADOWSOCKS_PREFIX) {
            Some(Self(line.to_string()))
        } else {
            None
        }
    }

    /// The full candidate string as it appeared in the list
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProxyCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProxyCandidate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Raw body of a fetched list plus its HTTP status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub status: u16,
    pub body: String,
}

impl FetchResult {
    pub fn new(status: u16, body: String) -> Self {
        Self { status, body }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Outcome of a single verification call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    /// Traffic went through; carries the externally observed IP
    Active(String),
    Inactive(String),
    /// The verifier itself could not be reached (DNS, refused connection, TLS)
    Unreachable(String),
    Timeout,
}

/// Verification result for one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub candidate: ProxyCandidate,
    pub status: VerificationStatus,
    pub response_time_ms: Option<u64>,
}

impl VerificationOutcome {
    pub fn active(candidate: ProxyCandidate, observed_ip: String, response_time_ms: u64) -> Self {
        Self {
            candidate,
            status: VerificationStatus::Active(observed_ip),
            response_time_ms: Some(response_time_ms),
        }
    }

    pub fn inactive(candidate: ProxyCandidate, reason: String) -> Self {
        Self {
            candidate,
            status: VerificationStatus::Inactive(reason),
            response_time_ms: None,
        }
    }

    pub fn unreachable(candidate: ProxyCandidate, reason: String) -> Self {
        Self {
            candidate,
            status: VerificationStatus::Unreachable(reason),
            response_time_ms: None,
        }
    }

    pub fn timeout(candidate: ProxyCandidate) -> Self {
        Self {
            candidate,
            status: VerificationStatus::Timeout,
            response_time_ms: None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, VerificationStatus::Active(_))
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self.status, VerificationStatus::Unreachable(_))
    }

    /// The IP the verifier saw, for active candidates
    pub fn observed_ip(&self) -> Option<&str> {
        match &self.status {
            VerificationStatus::Active(ip) => Some(ip),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_from_line() {
        let candidate = ProxyCandidate::from_line("ss://YWVzOnBhc3M@1.2.3.4:8388").unwrap();
        assert_eq!(candidate.as_str(), "ss://YWVzOnBhc3M@1.2.3.4:8388");
        assert_eq!(candidate.to_string(), "ss://YWVzOnBhc3M@1.2.3.4:8388");
    }

    #[test]
    fn test_candidate_rejects_other_schemes() {
        assert!(ProxyCandidate::from_line("vmess://abc").is_none());
        assert!(ProxyCandidate::from_line("ssr://abc").is_none());
        assert!(ProxyCandidate::from_line("SS://abc").is_none());
        assert!(ProxyCandidate::from_line("").is_none());
    }

    #[test]
    fn test_fetch_result_status() {
        assert!(FetchResult::new(200, String::new()).is_ok());
        assert!(!FetchResult::new(204, String::new()).is_ok());
        assert!(!FetchResult::new(500, String::new()).is_ok());
    }

    #[test]
    fn test_verification_outcome() {
        let candidate = ProxyCandidate::from_line("ss://abc").unwrap();

        let outcome = VerificationOutcome::active(candidate.clone(), "1.2.3.4".to_string(), 120);
        assert!(outcome.is_active());
        assert_eq!(outcome.observed_ip(), Some("1.2.3.4"));
        assert_eq!(outcome.response_time_ms, Some(120));

        let outcome = VerificationOutcome::inactive(candidate.clone(), "HTTP status: 404".to_string());
        assert!(!outcome.is_active());
        assert_eq!(outcome.observed_ip(), None);

        let outcome = VerificationOutcome::unreachable(candidate.clone(), "dns error".to_string());
        assert!(!outcome.is_active());
        assert!(outcome.is_unreachable());

        let outcome = VerificationOutcome::timeout(candidate);
        assert!(!outcome.is_unreachable());
        assert!(!outcome.is_active());
        assert_eq!(outcome.status, VerificationStatus::Timeout);
    }
}
