//! Input validation tests
//!
//! Tests for security-critical input validation in task-api.

/// Minimum password length (must match handler constant)
const MIN_PASSWORD_LEN: usize = 8;
/// Maximum task title length (must match handler constant)
const MAX_TITLE_LEN: usize = 200;
/// Maximum task description length (must match handler constant)
const MAX_DESCRIPTION_LEN: usize = 1000;

/// Validate an email address (mirrors the handler logic for testing)
fn is_valid_email(email: &str) -> bool {
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

/// Validate a task title (mirrors the handler logic for testing)
fn validate_title(title: &str) -> Result<(), &'static str> {
    if title.trim().is_empty() {
        return Err("Title is required");
    }
    if title.len() > MAX_TITLE_LEN {
        return Err("Title too long");
    }
    Ok(())
}

// ============================================================================
// Email Validation
// ============================================================================

#[test]
fn test_valid_simple_email() {
    assert!(is_valid_email("user@example.com"));
}

#[test]
fn test_valid_subdomain_email() {
    assert!(is_valid_email("user@mail.example.co.uk"));
}

#[test]
fn test_valid_plus_tag_email() {
    assert!(is_valid_email("user+tag@example.com"));
}

#[test]
fn test_invalid_empty_email() {
    assert!(!is_valid_email(""));
}

#[test]
fn test_invalid_no_at_sign() {
    assert!(!is_valid_email("userexample.com"));
}

#[test]
fn test_invalid_no_domain() {
    assert!(!is_valid_email("user@"));
}

#[test]
fn test_invalid_no_local_part() {
    assert!(!is_valid_email("@example.com"));
}

#[test]
fn test_invalid_undotted_domain() {
    assert!(!is_valid_email("user@localhost"));
}

#[test]
fn test_invalid_leading_dot_domain() {
    assert!(!is_valid_email("user@.example.com"));
}

#[test]
fn test_invalid_trailing_dot_domain() {
    assert!(!is_valid_email("user@example.com."));
}

#[test]
fn test_invalid_whitespace_in_email() {
    assert!(!is_valid_email("us er@example.com"));
    assert!(!is_valid_email("user@exam ple.com"));
    assert!(!is_valid_email("user@example.com\n"));
}

#[test]
fn test_invalid_double_at_sign() {
    assert!(!is_valid_email("user@ex@ample.com"));
}

#[test]
fn test_invalid_header_injection_attempt() {
    // CRLF in an email must never pass through to anything downstream
    assert!(!is_valid_email("user@example.com\r\nBcc: victim@example.com"));
}

// ============================================================================
// Password Strength
// ============================================================================

/// Validate password strength (mirrors the handler logic for testing)
fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password too short");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password needs an uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password needs a digit");
    }
    Ok(())
}

#[test]
fn test_valid_password() {
    assert!(validate_password("Passw0rd").is_ok());
    assert!(validate_password("Correct Horse 1").is_ok());
}

#[test]
fn test_password_below_minimum_rejected() {
    assert!(validate_password("Shor7").is_err());
}

#[test]
fn test_password_without_uppercase_rejected() {
    assert!(validate_password("passw0rdpassw0rd").is_err());
}

#[test]
fn test_password_without_digit_rejected() {
    assert!(validate_password("PasswordPassword").is_err());
}

#[test]
fn test_password_length_counts_chars_not_bytes() {
    // 8 multibyte chars with the required classes still passes
    assert!(validate_password("Pässw0rd").is_ok());
}

// ============================================================================
// Task Title
// ============================================================================

#[test]
fn test_valid_title() {
    assert!(validate_title("Water the plants").is_ok());
}

#[test]
fn test_invalid_empty_title() {
    assert!(validate_title("").is_err());
}

#[test]
fn test_invalid_whitespace_only_title() {
    assert!(validate_title("   \t ").is_err());
}

#[test]
fn test_title_at_max_length() {
    let title = "a".repeat(MAX_TITLE_LEN);
    assert!(validate_title(&title).is_ok());
}

#[test]
fn test_title_over_max_length() {
    let title = "a".repeat(MAX_TITLE_LEN + 1);
    assert!(validate_title(&title).is_err());
}

#[test]
fn test_title_with_sql_metacharacters_is_data_not_code() {
    // Titles are bound parameters, so quotes and semicolons are plain data
    assert!(validate_title("Robert'); DROP TABLE tasks;--").is_ok());
}

#[test]
fn test_description_length_boundary() {
    let ok = "a".repeat(MAX_DESCRIPTION_LEN);
    let too_long = "a".repeat(MAX_DESCRIPTION_LEN + 1);
    assert!(ok.len() <= MAX_DESCRIPTION_LEN);
    assert!(too_long.len() > MAX_DESCRIPTION_LEN);
}

// ============================================================================
// Task ID Path Parameters
// ============================================================================

#[test]
fn test_valid_uuid_task_id() {
    let uuid = "550e8400-e29b-41d4-a716-446655440000";
    assert!(uuid::Uuid::parse_str(uuid).is_ok());
}

#[test]
fn test_invalid_task_id_formats() {
    let invalid_ids = [
        "",
        "not-a-uuid",
        "550e8400-e29b-41d4-a716",
        "550e8400-e29b-41d4-a716-446655440000-extra",
        "' OR 1=1 --",
        "../../../etc/passwd",
    ];

    for id in &invalid_ids {
        assert!(uuid::Uuid::parse_str(id).is_err(), "Should reject: {}", id);
    }
}

// ============================================================================
// Sort Parameter Whitelist
// ============================================================================

/// Map a sort parameter to a column (mirrors the handler logic for testing)
fn sort_column(param: &str) -> Option<&'static str> {
    match param {
        "createdAt" => Some("created_at"),
        "dueDate" => Some("due_date"),
        "priority" => Some("priority"),
        "title" => Some("title"),
        _ => None,
    }
}

#[test]
fn test_sort_whitelist_accepts_known_fields() {
    assert_eq!(sort_column("createdAt"), Some("created_at"));
    assert_eq!(sort_column("dueDate"), Some("due_date"));
    assert_eq!(sort_column("priority"), Some("priority"));
    assert_eq!(sort_column("title"), Some("title"));
}

#[test]
fn test_sort_whitelist_rejects_arbitrary_columns() {
    // Sort fields reach the ORDER BY clause, so only the whitelist passes
    assert_eq!(sort_column("password_hash"), None);
    assert_eq!(sort_column("id; DROP TABLE tasks"), None);
    assert_eq!(sort_column("created_at"), None); // snake_case form not accepted
    assert_eq!(sort_column(""), None);
}

// ============================================================================
// Pagination Bounds
// ============================================================================

#[test]
fn test_limit_clamped_to_range() {
    let clamp = |limit: i64| -> i64 { limit.clamp(1, 100) };

    assert_eq!(clamp(10), 10);
    assert_eq!(clamp(0), 1);
    assert_eq!(clamp(-5), 1);
    assert_eq!(clamp(100), 100);
    assert_eq!(clamp(10_000), 100);
    assert_eq!(clamp(i64::MAX), 100);
}

#[test]
fn test_page_floored_at_one() {
    let floor = |page: i64| -> i64 { page.max(1) };

    assert_eq!(floor(1), 1);
    assert_eq!(floor(0), 1);
    assert_eq!(floor(-3), 1);
    assert_eq!(floor(i64::MIN), 1);
}

#[test]
fn test_offset_never_overflows_for_clamped_inputs() {
    // Saturating arithmetic (mirrors TaskQuery::offset): even an
    // unclamped page straight off the query string cannot wrap
    let offset =
        |page: i64, limit: i64| -> i64 { (page.max(1) - 1).saturating_mul(limit.clamp(1, 100)) };

    assert_eq!(offset(1, 10), 0);
    assert_eq!(offset(2, 10), 10);
    assert_eq!(offset(5, 100), 400);
    assert_eq!(offset(i64::MAX, 10), i64::MAX);
    assert!(offset(i64::MAX, 100) >= 0);
}
