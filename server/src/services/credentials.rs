//! Local input checks for login and signup.
//!
//! `Credentials` and `Registration` can only be built through these checks,
//! so an invalid request never reaches the identity backend.

use serde::Serialize;

use crate::error::AuthError;

const MISSING_LOGIN_FIELDS: &str = "Please enter your email and password";
const INVALID_EMAIL: &str = "Please enter a valid email address";
const MISSING_SIGNUP_FIELDS: &str = "Please fill in your name, email and password";
const PASSWORD_MISMATCH: &str = "Passwords do not match";

/// Trim and lower-case an email, rejecting anything without exactly one `@`
/// separating non-empty parts.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    if normalized.chars().any(char::is_whitespace) {
        return None;
    }
    Some(normalized)
}

/// Validated login credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if a field is empty or the email is malformed.
    pub fn new(email: &str, password: &str) -> Result<Self, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::validation(MISSING_LOGIN_FIELDS));
        }
        let email = normalize_email(email).ok_or_else(|| AuthError::validation(INVALID_EMAIL))?;
        Ok(Self { email, password: password.to_owned() })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Validated signup form. The confirmation is checked and then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    name: String,
    email: String,
    password: String,
}

impl Registration {
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] on missing fields, a malformed email,
    /// or a confirmation that differs from the password.
    pub fn new(name: &str, email: &str, password: &str, confirm_password: &str) -> Result<Self, AuthError> {
        let name = name.trim();
        if name.is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::validation(MISSING_SIGNUP_FIELDS));
        }
        if password != confirm_password {
            return Err(AuthError::validation(PASSWORD_MISMATCH));
        }
        let email = normalize_email(email).ok_or_else(|| AuthError::validation(INVALID_EMAIL))?;
        Ok(Self { name: name.to_owned(), email, password: password.to_owned() })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;
