//! Webhook Signature Verification
//!
//! Heleerra signs each webhook body with HMAC-SHA256 keyed by the merchant's
//! webhook secret and sends the lowercase hex digest in `X-Signature`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::observer::{PaymentEvent, PaymentObserver, TracingObserver};

type HmacSha256 = Hmac<Sha256>;

/// Checks webhook signatures against the configured secret
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Option<String>,
    observer: Arc<dyn PaymentObserver>,
}

impl WebhookVerifier {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PaymentObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Hex signature the gateway would send for `payload`
    pub fn sign(&self, payload: &str) -> Option<String> {
        let secret = self.secret.as_deref()?;
        let mac = keyed_mac(secret, payload).ok()?;
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    /// Verify `signature` for `payload`.
    ///
    /// Never fails: a missing secret, a malformed signature or a mismatch all
    /// come back as `false`.
    pub fn verify(&self, payload: &str, signature: &str) -> bool {
        let Some(secret) = self.secret.as_deref() else {
            self.observer.notify(&PaymentEvent::WebhookSecretMissing);
            return false;
        };

        let Some(provided) = decode_signature(signature) else {
            self.observer.notify(&PaymentEvent::SignatureMismatch);
            return false;
        };

        let mac = match keyed_mac(secret, payload) {
            Ok(mac) => mac,
            Err(e) => {
                self.observer.notify(&PaymentEvent::SignatureError { error: e.to_string() });
                return false;
            }
        };

        // verify_slice compares in constant time
        let is_valid = mac.verify_slice(&provided).is_ok();
        if !is_valid {
            self.observer.notify(&PaymentEvent::SignatureMismatch);
        }
        is_valid
    }
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("configured", &self.is_configured())
            .finish_non_exhaustive()
    }
}

fn keyed_mac(secret: &str, payload: &str) -> Result<HmacSha256, hmac::digest::InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

/// Only the lowercase hex form the gateway emits is accepted.
fn decode_signature(signature: &str) -> Option<Vec<u8>> {
    if signature.is_empty() || !signature.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return None;
    }
    hex::decode(signature).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::testing::RecordingObserver;

    const SECRET: &str = "test_webhook_secret";
    const PAYLOAD: &str = r#"{"status":"completed","data":{"ref_trx":"T1","amount":10}}"#;

    fn sign(secret: &str, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(Some(SECRET.into()))
    }

    #[test]
    fn test_valid_signature() {
        assert!(verifier().verify(PAYLOAD, &sign(SECRET, PAYLOAD)));
    }

    #[test]
    fn test_sign_matches_hmac_hex() {
        let signature = verifier().sign(PAYLOAD).unwrap();
        assert_eq!(signature, sign(SECRET, PAYLOAD));
        assert_eq!(signature.len(), 64);
    }

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2
        let verifier = WebhookVerifier::new(Some("Jefe".into()));
        assert!(verifier.verify(
            "what do ya want for nothing?",
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        ));
    }

    #[test]
    fn test_single_byte_payload_mutation() {
        let signature = sign(SECRET, PAYLOAD);
        let verifier = verifier();
        for i in 0..PAYLOAD.len() {
            let mut bytes = PAYLOAD.as_bytes().to_vec();
            bytes[i] = if bytes[i] == b'x' { b'y' } else { b'x' };
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(!verifier.verify(&mutated, &signature), "mutation at {i} accepted");
        }
    }

    #[test]
    fn test_single_byte_signature_mutation() {
        let signature = sign(SECRET, PAYLOAD);
        let verifier = verifier();
        for i in 0..signature.len() {
            for replacement in [b'0', b'f', b'A', b'z'] {
                let mut bytes = signature.as_bytes().to_vec();
                if bytes[i] == replacement {
                    continue;
                }
                bytes[i] = replacement;
                let mutated = String::from_utf8(bytes).unwrap();
                assert!(!verifier.verify(PAYLOAD, &mutated), "mutation at {i} accepted");
            }
        }
    }

    #[test]
    fn test_uppercase_signature_rejected() {
        let signature = sign(SECRET, PAYLOAD).to_uppercase();
        assert!(!verifier().verify(PAYLOAD, &signature));
    }

    #[test]
    fn test_wrong_secret() {
        assert!(!verifier().verify(PAYLOAD, &sign("other_secret", PAYLOAD)));
    }

    #[test]
    fn test_malformed_signatures() {
        let verifier = verifier();
        for sig in ["", "abc", "not-hex", "0g0g", &sign(SECRET, PAYLOAD)[..62]] {
            assert!(!verifier.verify(PAYLOAD, sig), "{sig:?} accepted");
        }
    }

    #[test]
    fn test_missing_secret_returns_false() {
        let recorder = Arc::new(RecordingObserver::default());
        let verifier = WebhookVerifier::new(None).with_observer(recorder.clone());
        assert!(!verifier.is_configured());
        assert!(!verifier.verify(PAYLOAD, &sign(SECRET, PAYLOAD)));
        assert_eq!(recorder.names(), vec!["webhook_secret_missing"]);
        assert!(verifier.sign(PAYLOAD).is_none());
    }

    #[test]
    fn test_empty_secret_counts_as_missing() {
        assert!(!WebhookVerifier::new(Some(String::new())).is_configured());
    }

    #[test]
    fn test_mismatch_is_reported() {
        let recorder = Arc::new(RecordingObserver::default());
        let verifier = verifier().with_observer(recorder.clone());
        assert!(!verifier.verify(PAYLOAD, &"0".repeat(64)));
        assert_eq!(recorder.count("signature_mismatch"), 1);
    }
}
