//! Session stores: token + profile persistence with expiry.
//!
//! ARCHITECTURE
//! ============
//! A session is two logical entries, the bearer token and the serialized
//! user profile, each with its own expiry. Three media implement the same
//! contract: process memory, the HTTP cookie jar, and a JSON file (CLI).
//!
//! TRADE-OFFS
//! ==========
//! `clear` never reports failure. Logout must always leave the caller in a
//! logged-out state, so removal errors are logged and dropped.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::Rng;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::types::User;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// CONTRACT
// =============================================================================

/// A live session read back from a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub token: String,
    /// Profile with `access_token` set to `token`.
    pub user: User,
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persistence medium for the current session.
pub trait SessionStore: Send {
    /// Write token and profile, both expiring `ttl_days` from now.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be written.
    fn persist(&mut self, token: &str, user: &User, ttl_days: u32) -> Result<(), SessionError>;

    /// Current session, or `None` if absent, expired, or undecodable.
    fn read(&self) -> Option<StoredSession>;

    /// Remove both entries. Idempotent.
    fn clear(&mut self);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry<T> {
    value: T,
    /// Unix seconds.
    expires_at: i64,
}

impl<T> Entry<T> {
    fn new(value: T, expires_at: OffsetDateTime) -> Self {
        Self { value, expires_at: expires_at.unix_timestamp() }
    }

    fn live_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at > now.unix_timestamp()
    }
}

fn expiry(now: OffsetDateTime, ttl_days: u32) -> OffsetDateTime {
    now + Duration::days(i64::from(ttl_days))
}

fn assemble(token: &Entry<String>, user: &Entry<User>, now: OffsetDateTime) -> Option<StoredSession> {
    if token.value.is_empty() || !token.live_at(now) || !user.live_at(now) {
        return None;
    }
    let expires_at = OffsetDateTime::from_unix_timestamp(token.expires_at.min(user.expires_at)).ok()?;
    let user = User { access_token: Some(token.value.clone()), ..user.value.clone() };
    Some(StoredSession { token: token.value.clone(), user, expires_at })
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Debug, Default, Clone)]
pub struct MemorySessionStore {
    token: Option<Entry<String>>,
    user: Option<Entry<User>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn persist_at(&mut self, token: &str, user: &User, ttl_days: u32, now: OffsetDateTime) {
        let expires_at = expiry(now, ttl_days);
        self.token = Some(Entry::new(token.to_owned(), expires_at));
        self.user = Some(Entry::new(user.without_token(), expires_at));
    }

    pub(crate) fn read_at(&self, now: OffsetDateTime) -> Option<StoredSession> {
        assemble(self.token.as_ref()?, self.user.as_ref()?, now)
    }

    /// True if neither entry is held, expired or not.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }
}

impl SessionStore for MemorySessionStore {
    fn persist(&mut self, token: &str, user: &User, ttl_days: u32) -> Result<(), SessionError> {
        self.persist_at(token, user, ttl_days, OffsetDateTime::now_utc());
        Ok(())
    }

    fn read(&self) -> Option<StoredSession> {
        self.read_at(OffsetDateTime::now_utc())
    }

    fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }
}

// =============================================================================
// COOKIES
// =============================================================================

/// Cookie names and flags for the HTTP session medium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub token_cookie: String,
    pub user_cookie: String,
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self { token_cookie: "token".into(), user_cookie: "user".into(), secure: false }
    }
}

/// Session store over a request's cookie jar. Writes accumulate in the jar,
/// which the handler returns as `Set-Cookie` headers via [`Self::into_jar`].
///
/// The browser drops both cookies at `Max-Age`; the user cookie additionally
/// carries its expiry so a stale or replayed cookie is rejected here too.
#[derive(Debug, Clone)]
pub struct CookieSessionStore {
    jar: CookieJar,
    settings: CookieSettings,
}

impl CookieSessionStore {
    #[must_use]
    pub fn new(jar: CookieJar, settings: CookieSettings) -> Self {
        Self { jar, settings }
    }

    #[must_use]
    pub fn into_jar(self) -> CookieJar {
        self.jar
    }

    /// Raw token cookie value, if present and non-empty.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.jar
            .get(&self.settings.token_cookie)
            .map(Cookie::value)
            .filter(|v| !v.is_empty())
    }

    fn session_cookie(&self, name: &str, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((name.to_owned(), value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.settings.secure)
            .max_age(max_age)
            .build()
    }

    pub(crate) fn persist_at(
        &mut self,
        token: &str,
        user: &User,
        ttl_days: u32,
        now: OffsetDateTime,
    ) -> Result<(), SessionError> {
        let expires_at = expiry(now, ttl_days);
        let max_age = Duration::days(i64::from(ttl_days));
        let envelope = serde_json::to_string(&Entry::new(user.without_token(), expires_at))?;

        let token_cookie = self.session_cookie(&self.settings.token_cookie, token.to_owned(), max_age);
        let user_cookie = self.session_cookie(
            &self.settings.user_cookie,
            urlencoding::encode(&envelope).into_owned(),
            max_age,
        );
        self.jar = self.jar.clone().add(token_cookie).add(user_cookie);
        Ok(())
    }

    pub(crate) fn read_at(&self, now: OffsetDateTime) -> Option<StoredSession> {
        let token = self.token()?;
        let raw = self.jar.get(&self.settings.user_cookie)?;
        let decoded = urlencoding::decode(raw.value()).ok()?;
        let user: Entry<User> = match serde_json::from_str(&decoded) {
            Ok(user) => user,
            Err(e) => {
                tracing::debug!(error = %e, "discarding undecodable user cookie");
                return None;
            }
        };
        // Token expiry is enforced by the browser; mirror the profile's.
        let token = Entry { value: token.to_owned(), expires_at: user.expires_at };
        assemble(&token, &user, now)
    }
}

impl SessionStore for CookieSessionStore {
    fn persist(&mut self, token: &str, user: &User, ttl_days: u32) -> Result<(), SessionError> {
        self.persist_at(token, user, ttl_days, OffsetDateTime::now_utc())
    }

    fn read(&self) -> Option<StoredSession> {
        self.read_at(OffsetDateTime::now_utc())
    }

    fn clear(&mut self) {
        let token_cookie = self.session_cookie(&self.settings.token_cookie, String::new(), Duration::ZERO);
        let user_cookie = self.session_cookie(&self.settings.user_cookie, String::new(), Duration::ZERO);
        self.jar = self.jar.clone().add(token_cookie).add(user_cookie);
    }
}

// =============================================================================
// FILE
// =============================================================================

#[derive(Serialize, Deserialize)]
struct SessionFile {
    token: Entry<String>,
    user: Entry<User>,
}

/// JSON-file session store used by the CLI.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn persist_at(
        &self,
        token: &str,
        user: &User,
        ttl_days: u32,
        now: OffsetDateTime,
    ) -> Result<(), SessionError> {
        let expires_at = expiry(now, ttl_days);
        let file = SessionFile {
            token: Entry::new(token.to_owned(), expires_at),
            user: Entry::new(user.without_token(), expires_at),
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&file)?)?;
        Ok(())
    }

    pub(crate) fn read_at(&self, now: OffsetDateTime) -> Option<StoredSession> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let file: SessionFile = match serde_json::from_str(&raw) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupted session file");
                return None;
            }
        };
        assemble(&file.token, &file.user, now)
    }
}

impl SessionStore for FileSessionStore {
    fn persist(&mut self, token: &str, user: &User, ttl_days: u32) -> Result<(), SessionError> {
        self.persist_at(token, user, ttl_days, OffsetDateTime::now_utc())
    }

    fn read(&self) -> Option<StoredSession> {
        self.read_at(OffsetDateTime::now_utc())
    }

    fn clear(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "session file removal failed"),
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
