// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request validation.

use std::sync::LazyLock;

use regex::Regex;
use saas_common::RegisterRequest;
use thiserror::Error;

use crate::auth::password::validate_password_strength;
use crate::config::PasswordRequirements;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_NAME_LENGTH: usize = 100;
// bcrypt only reads the first 72 bytes
const MAX_PASSWORD_BYTES: usize = 72;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidEmail(String),

    #[error("{0}")]
    InvalidPassword(String),

    #[error("{0}")]
    InvalidName(String),

    #[error("{0}")]
    Missing(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A registration request that passed validation
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    /// Trimmed, lowercased
    pub email: String,
    /// Trimmed; `None` when blank
    pub name: Option<String>,
    pub password: String,
}

/// Trim and lowercase an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() {
        return Err(ValidationError::Missing("Email is required".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email address cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Please provide a valid email address".to_string(),
        ));
    }

    Ok(email)
}

/// Trim a display name; blank names become `None`
pub fn normalize_name(name: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName(format!(
            "Name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }

    Ok(Some(name.to_string()))
}

/// Require a non-blank value, returning it trimmed
pub fn require<'a>(value: &'a str, what: &str) -> ValidationResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing(format!("{what} is required")));
    }
    Ok(trimmed)
}

/// Validate a registration request, collecting every problem.
///
/// Messages are joined with ", " in the order email, name, password.
pub fn validate_registration(
    req: &RegisterRequest,
    requirements: &PasswordRequirements,
) -> Result<ValidRegistration, Vec<String>> {
    let mut errors = Vec::new();

    let email = normalize_email(&req.email);
    if let Err(e) = validate_email(&email) {
        errors.push(e.to_string());
    }

    let name = match normalize_name(req.name.as_deref()) {
        Ok(name) => name,
        Err(e) => {
            errors.push(e.to_string());
            None
        },
    };

    if req.password.is_empty() {
        errors.push("Password is required".to_string());
    } else {
        errors.extend(validate_password_strength(&req.password, requirements));
        if req.password.len() > MAX_PASSWORD_BYTES {
            errors.push(format!(
                "Password cannot exceed {MAX_PASSWORD_BYTES} bytes"
            ));
        }
    }

    if errors.is_empty() {
        Ok(ValidRegistration {
            email,
            name,
            password: req.password.clone(),
        })
    } else {
        Err(errors)
    }
}
