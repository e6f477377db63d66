//! Webhook signature verification.
//!
//! The provider signs each webhook body with HMAC-SHA256 over the raw bytes
//! using a shared secret, and sends the hex digest in `X-Webhook-Signature`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verifies a hex-encoded HMAC-SHA256 signature over `payload`.
///
/// Comparison is constant-time. Malformed input (bad hex, wrong length) is a
/// verification failure, never an error: the caller only needs accept/reject.
pub fn verify_signature(payload: &[u8], signature_hex: &str, secret: &str) -> bool {
    let provided = match hex::decode(signature_hex.trim()) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload);
    let expected = mac.finalize().into_bytes();

    constant_time_compare(expected.as_slice(), &provided)
}

/// Constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes the hex signature for a payload. Test fixture helper.
#[cfg(test)]
pub fn sign_payload(payload: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "whsec_test_secret_12345";

    #[test]
    fn valid_signature_verifies() {
        let payload = br#"{"type":"transfer.sent","data":{"id":"txn_1"}}"#;
        let signature = sign_payload(payload, TEST_SECRET);
        assert!(verify_signature(payload, &signature, TEST_SECRET));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let payload = br#"{"type":"transfer.sent"}"#;
        let signature = sign_payload(payload, TEST_SECRET);
        assert!(!verify_signature(
            br#"{"type":"transfer.deposited"}"#,
            &signature,
            TEST_SECRET
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = br#"{"type":"transfer.sent"}"#;
        let signature = sign_payload(payload, "some_other_secret");
        assert!(!verify_signature(payload, &signature, TEST_SECRET));
    }

    #[test]
    fn malformed_hex_is_rejected_not_an_error() {
        let payload = b"body";
        assert!(!verify_signature(payload, "not hex at all", TEST_SECRET));
        assert!(!verify_signature(payload, "", TEST_SECRET));
        assert!(!verify_signature(payload, "abc", TEST_SECRET)); // odd length
    }

    #[test]
    fn truncated_signature_is_rejected() {
        let payload = b"body";
        let signature = sign_payload(payload, TEST_SECRET);
        assert!(!verify_signature(payload, &signature[..32], TEST_SECRET));
    }

    #[test]
    fn signature_with_surrounding_whitespace_verifies() {
        let payload = b"body";
        let signature = format!(" {} ", sign_payload(payload, TEST_SECRET));
        assert!(verify_signature(payload, &signature, TEST_SECRET));
    }

    proptest! {
        // Only the exact digest of the exact payload verifies.
        #[test]
        fn rejects_unless_digest_matches(
            payload in proptest::collection::vec(any::<u8>(), 0..256),
            candidate in "[0-9a-f]{0,128}",
        ) {
            let expected = sign_payload(&payload, TEST_SECRET);
            let verified = verify_signature(&payload, &candidate, TEST_SECRET);
            prop_assert_eq!(verified, candidate == expected);
        }

        #[test]
        fn accepts_own_digest(payload in proptest::collection::vec(any::<u8>(), 0..256)) {
            let signature = sign_payload(&payload, TEST_SECRET);
            prop_assert!(verify_signature(&payload, &signature, TEST_SECRET));
        }
    }
}
