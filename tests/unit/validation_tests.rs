// ==============================
// tests/unit/validation_tests.rs
// ==============================
//! Registration input rules
use backend_lib::config::PasswordRequirements;
use backend_lib::validation::{normalize_email, validate_email, validate_registration};
use saas_common::RegisterRequest;

fn request(email: &str, name: Option<&str>, password: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        name: name.map(str::to_string),
        password: password.to_string(),
    }
}

#[test]
fn test_email_normalization() {
    assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    assert!(validate_email("ada@example.com").is_ok());
    assert!(validate_email("not-an-email").is_err());
    assert!(validate_email("").is_err());
}

#[test]
fn test_valid_registration_is_normalized() {
    let valid = validate_registration(
        &request(" Ada@Example.com", Some("  Ada Lovelace "), "secret1"),
        &PasswordRequirements::default(),
    )
    .unwrap();

    assert_eq!(valid.email, "ada@example.com");
    assert_eq!(valid.name.as_deref(), Some("Ada Lovelace"));
}

#[test]
fn test_invalid_registration_collects_all_errors() {
    let errors = validate_registration(
        &request("nope", None, "abc"),
        &PasswordRequirements::default(),
    )
    .unwrap_err();

    assert_eq!(
        errors,
        vec![
            "Please provide a valid email address".to_string(),
            "Password must be at least 6 characters long".to_string(),
        ]
    );
}

#[test]
fn test_overlong_password_is_rejected() {
    let long = "a".repeat(73);
    let errors = validate_registration(
        &request("ada@example.com", None, &long),
        &PasswordRequirements::default(),
    )
    .unwrap_err();

    assert_eq!(errors.len(), 1);
}
