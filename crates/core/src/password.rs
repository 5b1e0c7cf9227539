//! Password hashing for doctor accounts.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$...`) carrying their own salt and
//! parameters, so verification needs nothing but the stored string.

use crate::{VaxError, VaxResult};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;
use std::sync::OnceLock;

/// Hashes `password` with a fresh random salt.
///
/// # Errors
///
/// Returns `VaxError::PasswordHash` if salt encoding or hashing fails.
pub fn hash_password(password: &str) -> VaxResult<String> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| VaxError::PasswordHash(e.to_string()))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| VaxError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC string.
///
/// A malformed stored hash is logged and treated as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Hash of a random password no caller can know, created on first use.
fn decoy_hash() -> Option<&'static str> {
    static DECOY: OnceLock<Option<String>> = OnceLock::new();
    DECOY
        .get_or_init(|| {
            let mut secret = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut secret);
            let secret: String = secret.iter().map(|b| format!("{b:02x}")).collect();
            hash_password(&secret)
                .map_err(|e| tracing::warn!("decoy hash unavailable: {}", e))
                .ok()
        })
        .as_deref()
}

/// Runs a full verification against a decoy hash and discards the result.
///
/// Called when a login names no known account, so that case costs the same as a wrong password.
pub fn verify_decoy(password: &str) {
    if let Some(hash) = decoy_hash() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("same password").expect("hashing should succeed");
        let b = hash_password("same password").expect("hashing should succeed");
        assert_ne!(a, b, "each hash should use a fresh salt");
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_decoy_hash_is_stable_argon2id() {
        let first = decoy_hash().expect("decoy hash should be created");
        assert!(first.starts_with("$argon2id$"));
        assert_eq!(decoy_hash(), Some(first));
        assert!(!verify_password("", first));
        verify_decoy("correct horse");
    }
}
