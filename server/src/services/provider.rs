//! Google OAuth service: authorize URL, code exchange, profile fetch.
//!
//! The resulting profile and provider access token become a regular session
//! through `AuthContext::complete_provider_login`, with the provider TTL.

use serde::Deserialize;

use crate::types::{AuthMethod, User};

pub const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Google OAuth client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl GoogleConfig {
    #[must_use]
    pub fn new(client_id: &str, client_secret: &str, redirect_uri: &str) -> Self {
        Self {
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            redirect_uri: redirect_uri.to_owned(),
            token_url: GOOGLE_TOKEN_URL.to_owned(),
            userinfo_url: GOOGLE_USERINFO_URL.to_owned(),
        }
    }

    /// Load from `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, `GOOGLE_REDIRECT_URI`.
    /// Returns `None` if any are missing (provider login disabled).
    #[must_use]
    pub fn from_lookup<F>(lookup: &F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = lookup("GOOGLE_CLIENT_ID")?;
        let client_secret = lookup("GOOGLE_CLIENT_SECRET")?;
        let redirect_uri = lookup("GOOGLE_REDIRECT_URI")?;
        Some(Self::new(&client_id, &client_secret, &redirect_uri))
    }

    /// Point token exchange and profile fetch somewhere else.
    #[must_use]
    pub fn with_endpoints(mut self, token_url: &str, userinfo_url: &str) -> Self {
        self.token_url = token_url.to_owned();
        self.userinfo_url = userinfo_url.to_owned();
        self
    }

    /// Build the Google authorization URL carrying the CSRF `state`.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{GOOGLE_AUTHORIZE_URL}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode("openid email profile"),
            urlencoding::encode(state),
        )
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleUser {
    pub sub: String,
    pub name: Option<String>,
    pub email: String,
}

impl GoogleUser {
    /// Convert to a session user, falling back to the email local part when
    /// Google returns no display name.
    #[must_use]
    pub fn into_user(self, access_token: &str) -> User {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| name_from_email(&self.email));
        User {
            id: self.sub,
            name,
            email: self.email,
            access_token: Some(access_token.to_owned()),
            auth_method: AuthMethod::Provider,
        }
    }
}

fn name_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("user")
        .to_owned()
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("google token exchange failed: {0}")]
    TokenExchange(String),
    #[error("google api error: {0}")]
    GoogleApi(String),
}

impl crate::error::ErrorCode for ProviderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::TokenExchange(_) => "E_PROVIDER_TOKEN_EXCHANGE",
            Self::GoogleApi(_) => "E_PROVIDER_API",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

/// Exchange an OAuth code for an access token.
pub async fn exchange_code(config: &GoogleConfig, code: &str) -> Result<String, ProviderError> {
    let client = reqwest::Client::new();
    let resp = client
        .post(&config.token_url)
        .header("Accept", "application/json")
        .form(&[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| ProviderError::TokenExchange(e.to_string()))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| ProviderError::TokenExchange(e.to_string()))?;
    if !status.is_success() {
        return Err(ProviderError::TokenExchange(format!("{status}: {body}")));
    }
    let token_resp: TokenResponse =
        serde_json::from_str(&body).map_err(|_| ProviderError::TokenExchange(format!("unexpected response: {body}")))?;
    Ok(token_resp.access_token)
}

/// Fetch the authenticated Google user's profile.
pub async fn fetch_google_user(config: &GoogleConfig, access_token: &str) -> Result<GoogleUser, ProviderError> {
    let client = reqwest::Client::new();
    let resp = client
        .get(&config.userinfo_url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| ProviderError::GoogleApi(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(ProviderError::GoogleApi(format!("{status}: {body}")));
    }

    resp.json::<GoogleUser>()
        .await
        .map_err(|e| ProviderError::GoogleApi(e.to_string()))
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
