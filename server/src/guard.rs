//! Route guard: page access by session presence.
//!
//! DESIGN
//! ======
//! `GuardRules::decide` is a pure function of the request path and the token
//! cookie, so it is tested without HTTP. `route_guard` is the axum
//! middleware that applies it to every request before routing.
//!
//! A token counts as valid when present and non-empty. Expiry is left to
//! the browser dropping the cookie at `Max-Age`; no signature is checked.

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Which paths the guard evaluates and where it sends people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardRules {
    pub auth_pages: Vec<String>,
    pub protected_prefixes: Vec<String>,
    pub home_path: String,
    pub login_path: String,
}

impl Default for GuardRules {
    fn default() -> Self {
        Self {
            auth_pages: vec!["/login".into(), "/signup".into()],
            protected_prefixes: vec!["/dashboard".into()],
            home_path: "/dashboard".into(),
            login_path: "/login".into(),
        }
    }
}

impl GuardRules {
    /// Decide what to do with a navigation to `path`.
    ///
    /// Ordered rules, first match wins:
    /// 1. auth page with a valid token: redirect home
    /// 2. protected path without a valid token: redirect to login
    /// 3. anything else: allow
    #[must_use]
    pub fn decide(&self, path: &str, token: Option<&str>) -> GuardDecision {
        let authed = token.is_some_and(|t| !t.is_empty());
        let auth_page = self.is_auth_page(path);

        if auth_page && authed {
            return GuardDecision::Redirect(self.home_path.clone());
        }
        if !auth_page && !authed && self.is_protected(path) {
            return GuardDecision::Redirect(self.login_redirect(path));
        }
        GuardDecision::Allow
    }

    /// `/login?callbackUrl=<path>` with the path percent-encoded.
    #[must_use]
    pub fn login_redirect(&self, path: &str) -> String {
        format!("{}?callbackUrl={}", self.login_path, urlencoding::encode(path))
    }

    /// Exact match: the router serves no trailing-slash variants.
    fn is_auth_page(&self, path: &str) -> bool {
        self.auth_pages.iter().any(|p| p == path)
    }

    fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            })
    }
}

/// Axum middleware applying [`GuardRules::decide`] to the token cookie.
///
/// Only navigations (`GET`/`HEAD`) are guarded; form posts to the auth pages
/// pass through so a stale session can be replaced.
pub async fn route_guard(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    if !matches!(*request.method(), Method::GET | Method::HEAD) {
        return next.run(request).await;
    }
    let path = request.uri().path().to_owned();
    let token = jar.get(&state.cookies.token_cookie).map(Cookie::value);

    match state.guard.decide(&path, token) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(location) => {
            tracing::debug!(%path, %location, "route guard redirect");
            Redirect::temporary(&location).into_response()
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
