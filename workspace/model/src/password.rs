//! Password hashing with argon2id.
//!
//! The `*_blocking` pair runs the hashing on tokio's blocking pool so
//! request handlers never stall a worker thread.

use std::sync::LazyLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Hash checked against when there is no stored hash to compare with,
/// so a missing account costs the same as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("guiana-unusable-password").ok());

/// Hashes a raw password into a PHC string.
pub fn hash_password(raw: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(raw.as_bytes(), &salt)?
        .to_string())
}

/// Checks a raw password against a stored PHC string.
/// A malformed stored hash never verifies.
pub fn verify_password(raw: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(raw.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Runs a full verification that can never succeed.
pub fn verify_dummy(raw: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        verify_password(raw, hash);
    }
    false
}

/// `hash_password` on the blocking pool.
pub async fn hash_password_blocking(raw: &str) -> Result<String, String> {
    let raw = raw.to_string();
    tokio::task::spawn_blocking(move || hash_password(&raw))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

/// `verify_password` on the blocking pool; `None` verifies against the dummy hash.
pub async fn verify_password_blocking(raw: &str, stored_hash: Option<&str>) -> bool {
    let raw = raw.to_string();
    let stored_hash = stored_hash.map(str::to_string);
    tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&raw, &hash),
        None => verify_dummy(&raw),
    })
    .await
    .unwrap_or(false)
}
