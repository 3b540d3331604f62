//! Base64 detection and decoding for subscription-style lists

use crate::error::ProbeError;
use crate::Result;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;

/// Whole-document base64: groups of four, then an optional padded tail
static BASE64_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$")
        .expect("Invalid base64 regex")
});

/// Standard alphabet with canonical padding, tolerating non-zero trailing bits
const LIST_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Heuristic check for a base64-encoded list
///
/// Whitespace and line breaks are ignored. Empty input is never base64.
pub fn looks_base64(text: &str) -> bool {
    let compact = strip_whitespace(text);
    !compact.is_empty() && BASE64_REGEX.is_match(&compact)
}

/// Decode a base64 list into its lines
///
/// Lines are split on `\n` with an optional trailing `\r`, the same way
/// [`str::lines`] treats plain text. Every line must be valid UTF-8.
pub fn decode_lines(text: &str) -> Result<Vec<String>> {
    let compact = strip_whitespace(text);
    let decoded = LIST_ENGINE
        .decode(compact.as_bytes())
        .map_err(|e| ProbeError::Decode(e.to_string()))?;

    split_lines(&decoded)
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            String::from_utf8(line.to_vec()).map_err(|e| {
                ProbeError::Decode(format!("line {} is not valid UTF-8: {}", index + 1, e))
            })
        })
        .collect()
}

fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    if bytes.is_empty() {
        return Vec::new();
    }

    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    // a lone \r is not a line break
    bytes
        .split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    #[test]
    fn test_looks_base64_padded() {
        assert!(looks_base64("c3M6Ly9hYmM="));
        assert!(looks_base64("YWI="));
        assert!(looks_base64("YQ=="));
        assert!(looks_base64("YWJj"));
    }

    #[test]
    fn test_looks_base64_ignores_line_breaks() {
        assert!(looks_base64("YWJj\nZGVm\r\n"));
        assert!(looks_base64("  YWJj ZGVm  "));
    }

    #[test]
    fn test_looks_base64_rejects_plain_lists() {
        assert!(!looks_base64("ss://abc\nfoo\nss://def"));
        assert!(!looks_base64("192.168.1.1:8080"));
        assert!(!looks_base64("YWJj-ZGVm"));
    }

    #[test]
    fn test_looks_base64_rejects_bad_padding() {
        assert!(!looks_base64("YWJ"));
        assert!(!looks_base64("Y==="));
        assert!(!looks_base64("YW=j"));
        assert!(!looks_base64("YWJj="));
    }

    #[test]
    fn test_looks_base64_empty() {
        assert!(!looks_base64(""));
        assert!(!looks_base64(" \n\t"));
    }

    #[test]
    fn test_decode_round_trip() {
        let original = "ss://abc\nfoo\nss://def\n";
        let encoded = STANDARD.encode(original);

        assert!(looks_base64(&encoded));
        let lines = decode_lines(&encoded).unwrap();
        assert_eq!(lines, original.lines().collect::<Vec<_>>());
    }

    #[test]
    fn test_decode_crlf_and_wrapped_input() {
        let encoded = STANDARD.encode("ss://one\r\nss://two");
        let (head, tail) = encoded.split_at(8);
        let wrapped = format!("{}\n{}\n", head, tail);

        let lines = decode_lines(&wrapped).unwrap();
        assert_eq!(lines, vec!["ss://one", "ss://two"]);
    }

    #[test]
    fn test_decode_keeps_blank_lines() {
        let encoded = STANDARD.encode("a\n\nb");
        assert_eq!(decode_lines(&encoded).unwrap(), vec!["a", "", "b"]);
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = decode_lines("YWJ").unwrap_err();
        assert!(matches!(err, ProbeError::Decode(_)));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let encoded = STANDARD.encode([b'o', b'k', b'\n', 0xff, 0xfe]);
        let err = decode_lines(&encoded).unwrap_err();
        match err {
            ProbeError::Decode(message) => assert!(message.contains("line 2")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_allows_trailing_bits() {
        assert!(looks_base64("YR=="));
        assert_eq!(decode_lines("YR==").unwrap(), vec!["a"]);
    }

    #[test]
    fn test_decode_keeps_lone_carriage_return() {
        let encoded = STANDARD.encode("ss://a\rss://b\nss://c");
        assert_eq!(decode_lines(&encoded).unwrap(), vec!["ss://a\rss://b", "ss://c"]);
    }

    #[test]
    fn test_split_lines_empty() {
        assert!(split_lines(b"").is_empty());
    }
}
