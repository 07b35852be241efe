//! Password hashing
//!
//! Admin passwords are stored as Argon2id PHC strings (algorithm, parameters,
//! salt and hash in one value). Verification runs inside the argon2 crate,
//! which compares in constant time.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;

/// Minimum accepted length for a new admin password
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash of a throwaway password, verified against when no account matches
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    let throwaway = uuid::Uuid::new_v4().to_string();
    Argon2::default()
        .hash_password(throwaway.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| tracing::error!("Failed to build dummy password hash: {}", e))
        .ok()
});

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
        .context("Password hashing failed")?;

    Ok(password_hash.to_string())
}

/// Verify a password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch and an error only when the stored hash
/// cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))
        .context("Failed to parse password hash")?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Password verification failed: {}", e))
            .context("Password verification error"),
    }
}

/// Spend the same Argon2 work as [`verify_password`] for a login that has no
/// matching account. Always returns false.
pub fn verify_dummy_password(password: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_argon2id_and_salted() {
        let hash1 = hash_password("lecture-notes-2025").unwrap();
        let hash2 = hash_password("lecture-notes-2025").unwrap();

        assert!(hash1.starts_with("$argon2id$"));
        assert_ne!(hash1, hash2, "random salt should give distinct hashes");
        assert!(!hash1.contains("lecture-notes-2025"));
    }

    #[test]
    fn test_verify_correct_and_wrong_password() {
        let hash = hash_password("correct horse").unwrap();

        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password("password", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_dummy_hash_is_real_argon2_work() {
        let hash = DUMMY_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!verify_dummy_password("lecture-notes-2025"));
        assert!(!verify_dummy_password(""));
    }

    #[test]
    fn test_unicode_password() {
        let hash = hash_password("পাসওয়ার্ড🔐").unwrap();
        assert!(verify_password("পাসওয়ার্ড🔐", &hash).unwrap());
    }
}
