//! Salted password digests for user records.
//!
//! Stored form: `hex(salt) + "$" + hex(sha256(salt || password))`.

use rand::Rng;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

fn salted_digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

/// Digests `password` with a freshly generated random salt.
#[must_use]
pub fn digest_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill(&mut salt);
    format!(
        "{}${}",
        hex::encode(salt),
        hex::encode(salted_digest(&salt, password))
    )
}

/// Checks `password` against a value produced by [`digest_password`].
///
/// This is the library's login check; the HTTP surface has no login route
/// and does not call it. Malformed stored values never verify.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    hex::encode(salted_digest(&salt, password)) == digest_hex
}
