//! Candidate extraction from decoded list lines

use crate::proxy::models::ProxyCandidate;

/// Picks shadowsocks entries out of a proxy list
pub struct ProxyExtractor;

impl ProxyExtractor {
    /// Parse a single list line
    ///
    /// The line is kept only if it starts with `ss://` exactly, without
    /// any leading whitespace.
    pub fn parse_line(line: &str) -> Option<ProxyCandidate> {
        ProxyCandidate::from_line(line)
    }

    /// Keep the shadowsocks lines, in source order, duplicates included
    pub fn extract<I, S>(lines: I) -> Vec<ProxyCandidate>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .filter_map(|line| Self::parse_line(line.as_ref()))
            .collect()
    }

    /// Extract candidates from a plain-text list
    pub fn extract_from_text(content: &str) -> Vec<ProxyCandidate> {
        Self::extract(content.lines())
    }
}
