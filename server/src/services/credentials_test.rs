use super::*;

// =============================================================================
// normalize_email
// =============================================================================

#[test]
fn normalize_email_accepts_basic_address() {
    assert_eq!(normalize_email("  USER@Example.com "), Some("user@example.com".to_owned()));
}

#[test]
fn normalize_email_rejects_invalid_values() {
    assert_eq!(normalize_email(""), None);
    assert_eq!(normalize_email("user"), None);
    assert_eq!(normalize_email("@example.com"), None);
    assert_eq!(normalize_email("user@"), None);
    assert_eq!(normalize_email("a@b@c"), None);
    assert_eq!(normalize_email("a b@example.com"), None);
}

// =============================================================================
// Credentials
// =============================================================================

#[test]
fn credentials_normalize_email() {
    let creds = Credentials::new(" Ada@Example.COM", "hunter2").unwrap();
    assert_eq!(creds.email(), "ada@example.com");
}

#[test]
fn credentials_require_both_fields() {
    let err = Credentials::new("", "pw").unwrap_err();
    assert_eq!(err, AuthError::validation("Please enter your email and password"));
    let err = Credentials::new("ada@example.com", "").unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
}

#[test]
fn credentials_reject_malformed_email() {
    let err = Credentials::new("not-an-email", "pw").unwrap_err();
    assert_eq!(err.message(), "Please enter a valid email address");
}

#[test]
fn credentials_keep_password_verbatim() {
    let creds = Credentials::new("ada@example.com", "  spaced  ").unwrap();
    let json = serde_json::to_value(&creds).unwrap();
    assert_eq!(json["password"], "  spaced  ");
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn registration_rejects_password_mismatch() {
    let err = Registration::new("Ada", "ada@example.com", "one", "two").unwrap_err();
    assert_eq!(err, AuthError::validation("Passwords do not match"));
}

#[test]
fn registration_requires_name() {
    let err = Registration::new("   ", "ada@example.com", "pw", "pw").unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
}

#[test]
fn registration_serializes_without_confirmation() {
    let reg = Registration::new(" Ada ", "ADA@example.com", "pw", "pw").unwrap();
    let json = serde_json::to_value(&reg).unwrap();
    assert_eq!(json, serde_json::json!({ "name": "Ada", "email": "ada@example.com", "password": "pw" }));
}
