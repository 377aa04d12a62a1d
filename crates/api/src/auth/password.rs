//! Argon2id password hashing and verification.
//!
//! Hashes are stored in PHC string format so the parameters and salt travel
//! with the hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Minimum accepted password length on registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash.
///
/// `Ok(false)` on mismatch; `Err` only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("shingle-and-tar").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("shingle-and-tar", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn short_password_rejected() {
        let msg = validate_password_strength("short").unwrap_err();
        assert!(msg.contains("at least 8 characters"));
        assert!(validate_password_strength("eight-ch").is_ok());
    }
}
