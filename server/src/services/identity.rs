//! Credential verifier: exchanges credentials with the identity backend.
//!
//! DESIGN
//! ======
//! `CredentialVerifier` is the seam between the session context and the
//! network. `IdentityClient` is the HTTP implementation; tests substitute
//! mocks. Status classification is pure so it can be tested without I/O.
//!
//! ERROR HANDLING
//! ==============
//! Every non-2xx status and transport failure maps onto the `AuthError`
//! taxonomy. Nothing is retried here; the caller re-prompts the user.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::credentials::{Credentials, Registration};
use crate::error::AuthError;
use crate::types::{IssuedSession, User};

const LOGIN_FALLBACK: &str = "Authentication failed";
const SIGNUP_FALLBACK: &str = "Failed to create account";
const SIGN_OUT_FALLBACK: &str = "Sign-out failed";

// =============================================================================
// TRAIT
// =============================================================================

/// Exchanges validated input for a bearer token and user profile.
///
/// Implementations perform no persistence; storing the result is the
/// caller's job.
#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// # Errors
    ///
    /// Returns the mapped [`AuthError`] for any backend or transport failure.
    async fn login(&self, credentials: &Credentials) -> Result<IssuedSession, AuthError>;

    /// # Errors
    ///
    /// Returns the mapped [`AuthError`] for any backend or transport failure.
    async fn signup(&self, registration: &Registration) -> Result<IssuedSession, AuthError>;

    /// Revoke `token` on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the call or is unreachable.
    async fn sign_out(&self, token: &str) -> Result<(), AuthError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    /// Build a client for `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unexpected`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Unexpected(format!("HTTP client build failed: {e}")))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn exchange<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<IssuedSession, AuthError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "identity exchange");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| classify_transport(&e, fallback))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| classify_transport(&e, fallback))?;

        if !(200..300).contains(&status) {
            return Err(classify_status(status, &text, fallback));
        }

        parse_auth_response(&text)
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for IdentityClient {
    async fn login(&self, credentials: &Credentials) -> Result<IssuedSession, AuthError> {
        self.exchange("/auth/login", credentials, LOGIN_FALLBACK)
            .await
    }

    async fn signup(&self, registration: &Registration) -> Result<IssuedSession, AuthError> {
        self.exchange("/auth/register", registration, SIGNUP_FALLBACK)
            .await
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        let url = format!("{}/auth/logout", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| classify_transport(&e, SIGN_OUT_FALLBACK))?;

        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(classify_status(status, &text, SIGN_OUT_FALLBACK))
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct AuthResponse {
    user: Option<User>,
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Map a non-2xx backend status onto the error taxonomy.
pub(crate) fn classify_status(status: u16, body: &str, fallback: &str) -> AuthError {
    match status {
        401 => AuthError::InvalidCredentials("Invalid email or password".into()),
        404 => AuthError::UserNotFound("User not found".into()),
        500..=599 => AuthError::ServerError("Server error. Please try again later.".into()),
        _ => {
            let message = serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_owned());
            AuthError::Unexpected(message)
        }
    }
}

fn classify_transport(err: &reqwest::Error, fallback: &str) -> AuthError {
    if err.is_timeout() {
        AuthError::Timeout("Connection timeout. Please try again.".into())
    } else {
        tracing::warn!(error = %err, "identity backend unreachable");
        AuthError::Unexpected(fallback.to_owned())
    }
}

/// Parse a 2xx body. A body without both `user` and `access_token` counts as
/// rejected credentials.
pub(crate) fn parse_auth_response(body: &str) -> Result<IssuedSession, AuthError> {
    let parsed: AuthResponse =
        serde_json::from_str(body).map_err(|_| AuthError::Unexpected("An unexpected error occurred".into()))?;
    match (parsed.user, parsed.access_token) {
        (Some(user), Some(token)) if !token.is_empty() => Ok(IssuedSession { user: user.without_token(), token }),
        _ => Err(AuthError::InvalidCredentials("Invalid credentials".into())),
    }
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
