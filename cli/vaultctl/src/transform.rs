//! Per-key value transformations.
//!
//! Certificate detection is a prefix heuristic, not certificate parsing: any
//! payload whose base64 form starts with `MI` followed by at least twenty
//! base64 characters is treated as DER, false positives included.

use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::{DecodeError, Engine as _, alphabet};
use std::borrow::Cow;
use once_cell::sync::Lazy;
use regex::Regex;

/// Width of base64 lines inside a PEM block.
pub const PEM_LINE_LENGTH: usize = 64;

/// First line of a PEM certificate block.
pub const PEM_HEADER: &str = "-----BEGIN CERTIFICATE-----";

/// Last line of a PEM certificate block.
pub const PEM_FOOTER: &str = "-----END CERTIFICATE-----";

static CERT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^MI[A-Za-z0-9+/=]{20,}").unwrap()
});

const LINE_BREAKS: &[char] = &['\r', '\n'];

/// Standard padded alphabet that tolerates non-zero trailing bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Decode a standard, padded base64 string.
///
/// Line breaks (`\r`, `\n`) are ignored, so values wrapped by `base64`
/// or copied from a PEM body decode as one string.
///
/// # Errors
///
/// Returns the decoder's error for invalid input.
pub fn decode(raw: &str) -> Result<Vec<u8>, DecodeError> {
    let input = if raw.contains(LINE_BREAKS) {
        Cow::Owned(raw.replace(LINE_BREAKS, ""))
    } else {
        Cow::Borrowed(raw)
    };
    LENIENT.decode(input.as_bytes())
}

/// Format decoded bytes as a PEM certificate if they look like one,
/// otherwise return them as text.
#[must_use]
pub fn maybe_format_certificate(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    if !CERT_PATTERN.is_match(&encoded) {
        return String::from_utf8_lossy(bytes).into_owned();
    }

    let mut pem = String::with_capacity(encoded.len() + encoded.len() / PEM_LINE_LENGTH + 64);
    pem.push_str(PEM_HEADER);
    // base64 output is ASCII, so byte offsets are char boundaries
    for start in (0..encoded.len()).step_by(PEM_LINE_LENGTH) {
        let end = (start + PEM_LINE_LENGTH).min(encoded.len());
        pem.push('\n');
        pem.push_str(&encoded[start..end]);
    }
    pem.push('\n');
    pem.push_str(PEM_FOOTER);
    pem
}

/// Decode a raw value and apply certificate formatting.
///
/// # Errors
///
/// Returns the decode error; the caller keeps the raw value in that case.
pub fn decode_value(raw: &str) -> Result<String, DecodeError> {
    decode(raw).map(|bytes| maybe_format_certificate(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_and_invalid() {
        assert_eq!(decode("aGVsbG8=").unwrap(), b"hello");
        assert!(decode("not base64!").is_err());
        assert!(decode("aGVsbG8").is_err());
    }

    #[test]
    fn test_decode_ignores_line_breaks() {
        let mut der = vec![0x30, 0x82, 0x01, 0x0a];
        der.extend(0u8..120);
        let encoded = STANDARD.encode(&der);
        assert!(encoded.len() > 76);

        let wrapped = format!("{}\n{}\r\n", &encoded[..76], &encoded[76..]);
        assert_eq!(decode(&wrapped).unwrap(), der);

        let pem = decode_value(&wrapped).unwrap();
        assert!(pem.starts_with(PEM_HEADER));
    }

    #[test]
    fn test_decode_allows_trailing_bits() {
        assert_eq!(decode("YR==").unwrap(), b"a");
        assert_eq!(decode("YQ==").unwrap(), b"a");
    }

    #[test]
    fn test_plain_text_is_returned_as_string() {
        assert_eq!(maybe_format_certificate(b"hello world"), "hello world");
        assert_eq!(maybe_format_certificate(b""), "");
    }

    #[test]
    fn test_der_bytes_become_pem() {
        let mut der = vec![0x30, 0x82, 0x01, 0x0a];
        der.extend((0u8..100).collect::<Vec<_>>());
        let encoded = STANDARD.encode(&der);
        assert!(encoded.starts_with("MII"));

        let pem = maybe_format_certificate(&der);
        let lines: Vec<&str> = pem.lines().collect();
        assert_eq!(lines.first(), Some(&PEM_HEADER));
        assert_eq!(lines.last(), Some(&PEM_FOOTER));
        assert_eq!(lines[1..lines.len() - 1].concat(), encoded);
        assert!(lines[1..lines.len() - 1].iter().all(|l| l.len() <= PEM_LINE_LENGTH));
        assert_eq!(lines[1].len(), PEM_LINE_LENGTH);
        assert!(!pem.ends_with('\n'));
    }

    #[test]
    fn test_short_mi_prefix_is_not_a_certificate() {
        // "MII" + too few characters after the prefix
        let der = [0x30, 0x82, 0x01, 0x0a];
        let out = maybe_format_certificate(&der);
        assert!(!out.starts_with(PEM_HEADER));
    }

    #[test]
    fn test_non_certificate_blob_with_prefix_is_still_formatted() {
        // not DER, but its base64 form still starts with "MI"
        let blob: Vec<u8> = [0x30, 0x80].into_iter().chain(0u8..16).collect();
        assert!(STANDARD.encode(&blob).starts_with("MI"));
        assert!(maybe_format_certificate(&blob).starts_with(PEM_HEADER));
    }

    #[test]
    fn test_decode_value() {
        assert_eq!(decode_value("c2VjcmV0").unwrap(), "secret");
        assert!(decode_value("%%%").is_err());
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let out = maybe_format_certificate(&[0x66, 0xff, 0x6f]);
        assert_eq!(out, "f\u{fffd}o");
    }
}
