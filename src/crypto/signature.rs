//! Webhook signature scheme: `hex(HMAC_SHA512(secret, raw_request_body))`.
//!
//! Verification operates on the exact raw byte body as received. Parsing and
//! re-serialising before verification would change the byte layout and
//! invalidate the signature, so callers must verify first and parse second.

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Compute the hex signature for a payload. Used by tests and by outbound
/// tooling that needs to produce provider-compatible signatures.
pub fn sign_body(secret: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a hex signature against the raw body.
///
/// Comparison happens inside `Mac::verify_slice`, which is constant-time.
/// Undecodable hex, wrong length, and mismatch all verify false.
pub fn verify_signature(secret: &[u8], body: &[u8], signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let mut mac = HmacSha512::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}
