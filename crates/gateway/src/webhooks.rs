//! Webhook header parsing and signature verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verify a GitHub webhook signature using HMAC-SHA256.
///
/// # Arguments
/// * `body` - Raw webhook body bytes
/// * `signature` - `sha256=<hex>` value from the `X-Hub-Signature-256` header
/// * `secret` - Webhook signing secret
///
/// # Returns
/// `true` if the signature is valid, `false` otherwise
#[must_use]
pub fn verify_webhook_signature(body: &[u8], signature: &str, secret: &str) -> bool {
    let Some(hex_signature) = signature.strip_prefix("sha256=") else {
        return false;
    };

    let Ok(signature_bytes) = hex::decode(hex_signature) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let computed = mac.finalize().into_bytes();

    // Constant-time comparison to prevent timing attacks
    computed.as_slice().ct_eq(&signature_bytes).into()
}

/// Parsed webhook headers.
#[derive(Debug, Clone)]
pub struct WebhookHeaders {
    /// Unique delivery ID.
    pub delivery_id: Option<String>,
    /// Event type (issues, ping, ...).
    pub event_type: Option<String>,
    /// HMAC signature.
    pub signature: Option<String>,
}

impl WebhookHeaders {
    /// Parse headers from a request.
    #[must_use]
    pub fn from_header_map(get_header: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            delivery_id: get_header("x-github-delivery"),
            event_type: get_header("x-github-event"),
            signature: get_header("x-hub-signature-256"),
        }
    }
}
