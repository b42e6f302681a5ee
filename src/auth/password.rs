use crate::error::AppError;
use bcrypt::{hash, verify};

/// Work factor for password hashing. High enough to resist offline brute
/// force on leaked hashes.
const BCRYPT_COST: u32 = 12;

/// A structurally valid bcrypt hash with the same cost as real account
/// hashes. Login compares against this when no account matches the given
/// email, so "unknown email" and "wrong password" take comparable time.
pub const DUMMY_HASH: &str = "$2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::Internal(format!("failed to verify password: {}", e)))
}

/// Burns one bcrypt comparison against [`DUMMY_HASH`] and discards the
/// result. Called on the unknown-email login path for timing equalization.
pub fn equalize_timing(password: &str) {
    let _ = verify(password, DUMMY_HASH);
}
