//! HMAC-SHA256 signing primitives shared by the session codec and the CSRF
//! token signer.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Derives a purpose-specific signing key from the application secret.
///
/// Distinct salts keep session signatures and CSRF signatures from being
/// interchangeable even though they share `SECRET_KEY`.
pub fn derive_key(secret: &str, salt: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"\x00");
    hasher.update(secret.as_bytes());
    hasher.finalize().into()
}

/// Signs `payload`, returning a base64url signature without padding.
pub fn sign(key: &[u8], payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(payload);
    b64_encode(&mac.finalize().into_bytes())
}

/// Verifies a base64url signature in constant time.
pub fn verify(key: &[u8], payload: &[u8], signature: &str) -> bool {
    let Some(sig_bytes) = b64_decode(signature) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(payload);
    mac.verify_slice(&sig_bytes).is_ok()
}

/// Constant-time string comparison via a keyed MAC over both inputs.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let mut mac = HmacSha256::new_from_slice(b"eq").expect("HMAC accepts any key length");
    mac.update(a.as_bytes());
    let tag = mac.finalize().into_bytes();

    let mut mac = HmacSha256::new_from_slice(b"eq").expect("HMAC accepts any key length");
    mac.update(b.as_bytes());
    mac.verify_slice(&tag).is_ok()
}

pub fn b64_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn b64_decode(input: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(input).ok()
}
