//! Identity types shared by the verifier, session stores, and routes.

use serde::{Deserialize, Serialize};

/// Identity record owned by the identity backend. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque stable identifier assigned by the backend.
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    /// Bearer credential for backend calls. Filled from the session token on
    /// read, never written into the stored profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// How this session was obtained. Backend records default to password.
    #[serde(default)]
    pub auth_method: AuthMethod,
}

/// Sign-in method recorded with the stored profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    #[default]
    Password,
    /// External identity provider; the token belongs to the provider, not
    /// the identity backend.
    Provider,
}

impl User {
    /// Copy of the profile with the bearer credential removed.
    #[must_use]
    pub fn without_token(&self) -> Self {
        Self { access_token: None, ..self.clone() }
    }
}

/// Result of a successful credential exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub user: User,
    pub token: String,
}
