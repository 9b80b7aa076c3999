//! Shared proptest generators for vaultctl tests.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use proptest::prelude::*;

/// Generate field names as they appear in Vault secrets.
pub fn key_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

/// Generate shell-style export names.
pub fn export_name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{0,15}"
}

/// Generate secret paths under a KV v2 mount.
pub fn secret_path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z0-9-]{1,10}", 1..4)
        .prop_map(|segments| format!("secret/data/{}", segments.join("/")))
}

/// Generate plain secret values without quotes or newlines.
pub fn plain_value_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 _.:/@+=-]{0,40}"
}

/// Generate values that may contain single quotes.
pub fn quoted_value_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ']{0,40}"
}

/// Generate DER-looking certificate bytes.
///
/// A DER certificate starts with a SEQUENCE tag and a two-byte length
/// (`0x30 0x82`), which base64-encodes to `MII`.
pub fn der_certificate_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 20..200).prop_map(|body| {
        let mut der = vec![0x30, 0x82];
        der.extend(body);
        der
    })
}

/// Generate base64 of DER-looking certificate bytes.
pub fn encoded_certificate_strategy() -> impl Strategy<Value = String> {
    der_certificate_strategy().prop_map(|der| STANDARD.encode(der))
}

/// Generate text whose base64 encoding never starts with `MI`.
pub fn non_certificate_text_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9 ]{0,40}"
}

/// Generate base64 of text that is not a certificate.
pub fn encoded_text_strategy() -> impl Strategy<Value = (String, String)> {
    non_certificate_text_strategy().prop_map(|text| {
        let encoded = STANDARD.encode(text.as_bytes());
        (text, encoded)
    })
}

/// Generate strings that are never valid standard base64.
pub fn invalid_base64_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,10}[!*?][a-z]{0,10}"
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn encoded_certificates_start_with_mi(encoded in encoded_certificate_strategy()) {
            prop_assert!(encoded.starts_with("MI"));
        }

        #[test]
        fn encoded_text_never_starts_with_mi((_, encoded) in encoded_text_strategy()) {
            prop_assert!(!encoded.starts_with("MI"));
        }

        #[test]
        fn invalid_base64_fails_to_decode(value in invalid_base64_strategy()) {
            prop_assert!(STANDARD.decode(value).is_err());
        }

        #[test]
        fn secret_paths_have_mount_prefix(path in secret_path_strategy()) {
            prop_assert!(path.starts_with("secret/data/"));
            prop_assert!(!path.contains("//"));
        }
    }
}
