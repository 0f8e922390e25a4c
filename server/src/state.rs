//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the credential verifier and the session settings. Sessions
//! themselves live in the browser's cookies; each request builds a fresh
//! `AuthContext` over its own cookie jar.

use std::sync::Arc;

use axum_extra::extract::cookie::CookieJar;

use crate::config::AppConfig;
use crate::guard::GuardRules;
use crate::services::context::{AuthContext, SessionPolicy};
use crate::services::identity::CredentialVerifier;
use crate::services::provider::GoogleConfig;
use crate::services::session::{CookieSessionStore, CookieSettings};

/// Shared application state, injected into Axum handlers via State extractor.
/// Cheap to clone: the verifier is shared, settings are small.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn CredentialVerifier>,
    pub cookies: CookieSettings,
    pub policy: SessionPolicy,
    pub guard: GuardRules,
    /// `None` if Google OAuth env vars are not configured.
    pub google: Option<GoogleConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(verifier: Arc<dyn CredentialVerifier>, config: &AppConfig) -> Self {
        Self {
            verifier,
            cookies: config.cookies.clone(),
            policy: config.policy.clone(),
            guard: GuardRules::default(),
            google: config.google.clone(),
        }
    }

    /// Resolved auth context over this request's cookies.
    #[must_use]
    pub fn auth_context(&self, jar: CookieJar) -> AuthContext<CookieSessionStore> {
        let store = CookieSessionStore::new(jar, self.cookies.clone());
        let ctx = AuthContext::new(self.verifier.clone(), store, self.policy.clone());
        ctx.resolve();
        ctx
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
