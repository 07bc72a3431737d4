use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

/// Hashes a plaintext password at bcrypt's default cost.
pub fn hash_password(plain: &str) -> Result<String, AppError> {
    Ok(hash(plain, DEFAULT_COST)?)
}

/// Checks a plaintext password against a stored bcrypt hash. A malformed
/// stored hash counts as a mismatch, so a corrupt row cannot turn login
/// into a 500.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    verify(plain, stored_hash).unwrap_or(false)
}
