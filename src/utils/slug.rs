use rand::TryRngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Number of random bytes behind a slug; hex-encoded it doubles in length.
const SLUG_BYTES: usize = 2;

/// Generates a random 4-character lowercase hex slug.
pub fn generate_slug() -> String {
    let mut buf = [0u8; SLUG_BYTES];
    OsRng.try_fill_bytes(&mut buf).expect("OsRng failed");
    hex::encode(buf)
}

/// Generates a random session-scoped CSRF seed.
///
/// 64 random bytes hashed with SHA-256 and hex-encoded.
pub fn generate_csrf_seed() -> String {
    let mut buf = [0u8; 64];
    OsRng.try_fill_bytes(&mut buf).expect("OsRng failed");
    hex::encode(Sha256::digest(buf))
}
