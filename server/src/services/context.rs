//! Auth context: the session state machine readers observe.
//!
//! DESIGN
//! ======
//! State is an explicit `Resolving | Authenticated | Unauthenticated` union
//! published through a `watch` channel. Readers snapshot or subscribe; only
//! login, signup, provider login, and logout write, and they are the only
//! code that touches the session store.
//!
//! Each write takes a sequence number. A credential exchange that finishes
//! after a newer write has started is discarded instead of overwriting the
//! newer state, so a logout also cancels an in-flight login.
//!
//! The store mutex is never held across an await. Sequence checks, store
//! writes, and state publication happen under the same lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;

use super::credentials::{Credentials, Registration};
use super::identity::CredentialVerifier;
use super::session::{SessionStore, StoredSession};
use crate::error::{AuthError, ErrorCode};
use crate::types::{AuthMethod, IssuedSession, User};

pub const DEFAULT_PASSWORD_TTL_DAYS: u32 = 7;
pub const DEFAULT_PROVIDER_TTL_DAYS: u32 = 30;

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Resolving,
    Authenticated(User),
    Unauthenticated,
}

impl AuthState {
    #[must_use]
    pub fn view(&self) -> AuthView {
        match self {
            Self::Resolving => AuthView { user: None, loading: true },
            Self::Authenticated(user) => AuthView { user: Some(user.clone()), loading: false },
            Self::Unauthenticated => AuthView { user: None, loading: false },
        }
    }
}

/// `{user, loading}` projection consumed by pages and the JSON API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthView {
    pub user: Option<User>,
    pub loading: bool,
}

/// Session lifetimes and the route logout sends users to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    pub password_ttl_days: u32,
    pub provider_ttl_days: u32,
    pub landing_path: String,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            password_ttl_days: DEFAULT_PASSWORD_TTL_DAYS,
            provider_ttl_days: DEFAULT_PROVIDER_TTL_DAYS,
            landing_path: "/".into(),
        }
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

pub struct AuthContext<S> {
    verifier: Arc<dyn CredentialVerifier>,
    store: Mutex<S>,
    state: watch::Sender<AuthState>,
    sequence: AtomicU64,
    policy: SessionPolicy,
}

impl<S: SessionStore> AuthContext<S> {
    #[must_use]
    pub fn new(verifier: Arc<dyn CredentialVerifier>, store: S, policy: SessionPolicy) -> Self {
        let (state, _) = watch::channel(AuthState::Resolving);
        Self { verifier, store: Mutex::new(store), state, sequence: AtomicU64::new(0), policy }
    }

    fn lock_store(&self) -> MutexGuard<'_, S> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Derive state from the store. Never touches the network.
    pub fn resolve(&self) -> AuthView {
        let store = self.lock_store();
        let next = match store.read() {
            Some(session) => AuthState::Authenticated(session.user),
            None => AuthState::Unauthenticated,
        };
        self.state.send_replace(next);
        self.view()
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn view(&self) -> AuthView {
        self.state.borrow().view()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Live session currently held by the store.
    #[must_use]
    pub fn session(&self) -> Option<StoredSession> {
        self.lock_store().read()
    }

    #[must_use]
    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] before any network call on bad input,
    /// the verifier's error on rejection, or [`AuthError::Superseded`] if a
    /// newer write started meanwhile.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let credentials = Credentials::new(email, password)?;
        let ticket = self.begin();
        let issued = self.verifier.login(&credentials).await;
        self.settle(ticket, issued, self.policy.password_ttl_days, "login")
    }

    /// # Errors
    ///
    /// Same as [`Self::login`]; a password/confirmation mismatch is a
    /// validation error and sends nothing.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, AuthError> {
        let registration = Registration::new(name, email, password, confirm_password)?;
        let ticket = self.begin();
        let issued = self.verifier.signup(&registration).await;
        self.settle(ticket, issued, self.policy.password_ttl_days, "signup")
    }

    /// Adopt a session obtained from an external identity provider.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unexpected`] if the store cannot be written.
    pub fn complete_provider_login(&self, user: User, token: &str) -> Result<User, AuthError> {
        let ticket = self.begin();
        let user = User { auth_method: AuthMethod::Provider, ..user };
        let issued = IssuedSession { user, token: token.to_owned() };
        self.settle(ticket, Ok(issued), self.policy.provider_ttl_days, "provider")
    }

    /// Clear the session and return the route to navigate to.
    ///
    /// Local state is cleared first; the remote sign-out is best effort and
    /// its failure only logs. Provider sessions hold a third-party token and
    /// are never sent to the identity backend.
    pub async fn logout(&self) -> String {
        self.begin();
        let session = {
            let mut store = self.lock_store();
            let session = store.read();
            store.clear();
            self.state.send_replace(AuthState::Unauthenticated);
            session
        };

        match session {
            Some(session) if session.user.auth_method == AuthMethod::Password => {
                if let Err(e) = self.verifier.sign_out(&session.token).await {
                    tracing::warn!(
                        error = %e,
                        code = e.error_code(),
                        retryable = e.retryable(),
                        "remote sign-out failed; session cleared locally"
                    );
                }
            }
            Some(session) => {
                tracing::debug!(user_id = %session.user.id, "provider session cleared locally");
            }
            None => {}
        }

        self.policy.landing_path.clone()
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn settle(
        &self,
        ticket: u64,
        issued: Result<IssuedSession, AuthError>,
        ttl_days: u32,
        method: &'static str,
    ) -> Result<User, AuthError> {
        let issued = issued.inspect_err(|e| {
            tracing::info!(method, code = e.error_code(), "sign-in rejected");
        })?;

        let mut store = self.lock_store();
        if self.sequence.load(Ordering::SeqCst) != ticket {
            tracing::debug!(method, "discarding superseded sign-in result");
            return Err(AuthError::Superseded);
        }

        store.persist(&issued.token, &issued.user, ttl_days).map_err(|e| {
            tracing::error!(method, error = %e, "session persist failed");
            AuthError::Unexpected("An unexpected error occurred".into())
        })?;

        let user = User { access_token: Some(issued.token), ..issued.user };
        self.state.send_replace(AuthState::Authenticated(user.clone()));
        tracing::info!(method, user_id = %user.id, ttl_days, "signed in");
        Ok(user)
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
