//! Password strength rules for new admin accounts.

use super::{FieldError, ValidationResult};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Checks `password` against every strength rule and reports all failures.
pub fn validate_password(password: &str) -> ValidationResult {
    ValidationResult::from_errors(password_errors(password))
}

pub(crate) fn password_errors(password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(FieldError::new(
            "password",
            format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            ),
            "min_length",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least one uppercase letter",
            "uppercase",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least one lowercase letter",
            "lowercase",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least one number",
            "digit",
        ));
    }

    errors
}
