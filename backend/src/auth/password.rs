//! Password hashing helpers.
//!
//! Argon2id with the library defaults; hashes are stored in PHC string
//! format so parameters can evolve without a migration.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use thiserror::Error;

/// Failures while hashing a password.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

/// Hash `password` with a fresh random salt.
///
/// # Errors
/// Returns [`PasswordHashError`] if the hasher rejects its inputs, which
/// does not happen for non-empty UTF-8 passwords.
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHashError {
            message: err.to_string(),
        })
}

/// Whether `password` matches the stored PHC-format `hash`.
///
/// An unparsable hash verifies as false rather than erroring; a corrupt row
/// must not let a login through.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
