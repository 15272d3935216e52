use hmac::{Hmac, Mac};
use log::trace;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Calculates the webhook signature for a payload: lowercase hex HMAC-SHA256 over the exact raw bytes.
pub fn calculate_signature(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies the signature header against the raw request body. The comparison is constant-time; a header that is
/// not valid hex fails outright.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature) else {
        trace!("🔐️ Signature header is not valid hex");
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
