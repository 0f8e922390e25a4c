//! Server configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` loads `.env` via `dotenvy`, then builds an `AppConfig` once.
//! Parsing goes through a lookup function so tests can supply a map
//! instead of mutating the process environment.

use std::time::Duration;

use crate::services::context::{DEFAULT_PASSWORD_TTL_DAYS, DEFAULT_PROVIDER_TTL_DAYS, SessionPolicy};
use crate::services::provider::GoogleConfig;
use crate::services::session::CookieSettings;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_IDENTITY_URL: &str = "http://localhost:8000";
pub const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        "E_CONFIG_PARSE"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Identity backend base URL, without trailing slash.
    pub identity_url: String,
    pub identity_timeout: Duration,
    pub cookies: CookieSettings,
    pub policy: SessionPolicy,
    /// `None` disables provider login.
    pub google: Option<GoogleConfig>,
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `IDENTITY_API_URL`: default `http://localhost:8000`
    /// - `IDENTITY_TIMEOUT_SECS`: default 10
    /// - `SESSION_COOKIE_NAME` / `USER_COOKIE_NAME`: default `token` / `user`
    /// - `PASSWORD_SESSION_TTL_DAYS` / `PROVIDER_SESSION_TTL_DAYS`: default 7 / 30
    /// - `COOKIE_SECURE`: inferred from `GOOGLE_REDIRECT_URI` when unset
    /// - `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, `GOOGLE_REDIRECT_URI`
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let google = GoogleConfig::from_lookup(&lookup);
        let secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { var: "COOKIE_SECURE", value: raw })?,
            None => lookup("GOOGLE_REDIRECT_URI").is_some_and(|uri| uri.starts_with("https://")),
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            identity_url: lookup("IDENTITY_API_URL")
                .unwrap_or_else(|| DEFAULT_IDENTITY_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            identity_timeout: Duration::from_secs(parse_or(
                &lookup,
                "IDENTITY_TIMEOUT_SECS",
                DEFAULT_IDENTITY_TIMEOUT_SECS,
            )?),
            cookies: CookieSettings {
                token_cookie: lookup("SESSION_COOKIE_NAME").unwrap_or_else(|| "token".into()),
                user_cookie: lookup("USER_COOKIE_NAME").unwrap_or_else(|| "user".into()),
                secure,
            },
            policy: SessionPolicy {
                password_ttl_days: parse_or(&lookup, "PASSWORD_SESSION_TTL_DAYS", DEFAULT_PASSWORD_TTL_DAYS)?,
                provider_ttl_days: parse_or(&lookup, "PROVIDER_SESSION_TTL_DAYS", DEFAULT_PROVIDER_TTL_DAYS)?,
                ..SessionPolicy::default()
            },
            google,
        })
    }
}

/// `1/true/yes/on` or `0/false/no/off`, case-insensitive.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
