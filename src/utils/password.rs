use anyhow::{Context, Result};

/// Hash a password with bcrypt at the default cost.
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).context("Failed to hash password")
}

/// Check a candidate password against a stored bcrypt hash. A stored
/// hash that bcrypt cannot parse counts as a failed match, so one
/// corrupted row rejects that login instead of erroring.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
