use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::ServiceError;

/// Outcome of checking a password against the stored `senha` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Valid,
    /// Matched a plaintext value stored before hashing was introduced; the
    /// caller should replace it with a hash.
    ValidLegacy,
    Invalid,
}

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())
        .map_err(|e| ServiceError::HashError(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::HashError(e.to_string()))
}

pub fn verify_password(stored: &str, candidate: &str) -> Result<PasswordCheck, ServiceError> {
    if stored.starts_with("$argon2") {
        let parsed =
            PasswordHash::new(stored).map_err(|e| ServiceError::HashError(e.to_string()))?;
        return Ok(
            match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
                Ok(()) => PasswordCheck::Valid,
                Err(_) => PasswordCheck::Invalid,
            },
        );
    }

    if !stored.is_empty() && constant_time_eq(stored.as_bytes(), candidate.as_bytes()) {
        Ok(PasswordCheck::ValidLegacy)
    } else {
        Ok(PasswordCheck::Invalid)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
