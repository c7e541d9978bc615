// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use zeroize::{Zeroize, Zeroizing};

use crate::error::AppError;
pub use crate::config::PasswordRequirements;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash a password with bcrypt on the current thread
pub fn hash_password_blocking(plain: &str, cost: u32) -> Result<String, AppError> {
    bcrypt::hash(plain, cost).map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// Hash a password with bcrypt on the blocking pool
pub async fn hash_password(plain: &str, cost: u32) -> Result<String, AppError> {
    let plain = Zeroizing::new(plain.to_owned());
    tokio::task::spawn_blocking(move || hash_password_blocking(&plain, cost)).await?
}

/// Verify a password against a bcrypt hash.
///
/// A malformed hash verifies as false.
pub fn verify_password_blocking(hash: &str, plain: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}

/// Verify a password against a bcrypt hash on the blocking pool
pub async fn verify_password(hash: &str, plain: &str) -> bool {
    let hash = hash.to_owned();
    let plain = Zeroizing::new(plain.to_owned());
    tokio::task::spawn_blocking(move || verify_password_blocking(&hash, &plain))
        .await
        .unwrap_or(false)
}

/// Check a password against the complexity requirements.
///
/// Returns one message per unmet requirement; empty means the password is acceptable.
pub fn validate_password_strength(password: &str, requirements: &PasswordRequirements) -> Vec<String> {
    let mut errors = Vec::new();

    if password.chars().count() < requirements.min_length {
        errors.push(format!(
            "Password must be at least {} characters long",
            requirements.min_length
        ));
    }

    if requirements.require_uppercase && !password.chars().any(char::is_uppercase) {
        errors.push("Password must contain an uppercase letter".to_string());
    }

    if requirements.require_lowercase && !password.chars().any(char::is_lowercase) {
        errors.push("Password must contain a lowercase letter".to_string());
    }

    if requirements.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain a digit".to_string());
    }

    if requirements.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
        errors.push("Password must contain a special character".to_string());
    }

    errors
}

/// Hash a password, then zeroize the plaintext
pub async fn hash_password_secure(plain: &mut String, cost: u32) -> Result<String, AppError> {
    let hash = hash_password(plain, cost).await;
    plain.zeroize();
    hash
}
