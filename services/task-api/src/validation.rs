//! Request body validation
//!
//! Field checks run before any handler logic; failures come back as a
//! 400 with per-field errors.

use crate::error::{ApiError, FieldError};

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 8;
/// Minimum display name length
pub const MIN_NAME_LEN: usize = 2;
/// Maximum display name length
pub const MAX_NAME_LEN: usize = 100;
/// Maximum task title length
pub const MAX_TITLE_LEN: usize = 200;
/// Maximum task description length
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Loose email shape check: one '@' with a dotted domain, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
}

/// Password strength check: length, one uppercase letter, one digit
pub fn validate_password(password: &str) -> Result<(), FieldError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(FieldError::new(
            "password",
            "Password must contain an uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(FieldError::new("password", "Password must contain a digit"));
    }
    Ok(())
}

/// Validate registration input
pub fn validate_register(email: &str, password: &str, name: &str) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if !is_valid_email(email) {
        errors.push(FieldError::new("email", "Invalid email address"));
    }
    if let Err(e) = validate_password(password) {
        errors.push(e);
    }
    let name_len = name.trim().chars().count();
    if name_len < MIN_NAME_LEN || name_len > MAX_NAME_LEN {
        errors.push(FieldError::new(
            "name",
            format!("Name must be {MIN_NAME_LEN} to {MAX_NAME_LEN} characters"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Validate login input
pub fn validate_login(email: &str, password: &str) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if !is_valid_email(email) {
        errors.push(FieldError::new("email", "Invalid email address"));
    }
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Validate a task title (create requires one; update validates if present)
pub fn validate_title(title: &str) -> Result<(), FieldError> {
    if title.trim().is_empty() {
        return Err(FieldError::new("title", "Title is required"));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(FieldError::new(
            "title",
            format!("Title must be at most {MAX_TITLE_LEN} characters"),
        ));
    }
    Ok(())
}

/// Validate an optional task description
pub fn validate_description(description: Option<&str>) -> Result<(), FieldError> {
    if let Some(description) = description {
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(FieldError::new(
                "description",
                format!("Description must be at most {MAX_DESCRIPTION_LEN} characters"),
            ));
        }
    }
    Ok(())
}

/// Collect field errors into a validation failure, or pass
pub fn collect(errors: Vec<FieldError>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@sub.example.co"));
        assert!(is_valid_email("u+tag@example.org"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("user"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@example.com."));
        assert!(!is_valid_email("us er@example.com"));
        assert!(!is_valid_email("user@ex@ample.com"));
    }

    #[test]
    fn test_register_collects_all_failures() {
        let err = validate_register("bad", "short", " ").unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
                assert_eq!(fields, vec!["email", "password", "name"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_register_accepts_good_input() {
        assert!(validate_register("user@example.com", "Passw0rd", "Ann").is_ok());
    }

    #[test]
    fn test_password_rules() {
        // Length boundary at 8
        assert!(validate_password("Passw0r").is_err());
        assert!(validate_password("Passw0rd").is_ok());
        // Missing uppercase
        assert!(validate_password("passw0rd").is_err());
        // Missing digit
        assert!(validate_password("Password").is_err());
    }

    #[test]
    fn test_name_length_limits() {
        assert!(validate_register("user@example.com", "Passw0rd", "A").is_err());
        assert!(validate_register("user@example.com", "Passw0rd", "Al").is_ok());
        assert!(validate_register("user@example.com", "Passw0rd", &"x".repeat(100)).is_ok());
        assert!(validate_register("user@example.com", "Passw0rd", &"x".repeat(101)).is_err());
    }

    #[test]
    fn test_title_limits() {
        assert!(validate_title("Water the plants").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN)).is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn test_description_limits() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some("short")).is_ok());
        assert!(validate_description(Some(&"x".repeat(MAX_DESCRIPTION_LEN + 1))).is_err());
    }
}
