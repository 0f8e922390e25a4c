//! Auth routes: JSON login/signup/logout, current user, Google OAuth flow.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::error::{AuthError, ErrorCode};
use crate::services::context::{AuthState, AuthView};
use crate::services::provider;
use crate::services::session::generate_token;
use crate::state::AppState;
use crate::types::User;

const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";
const PROVIDER_FAILED_REDIRECT: &str = "/login?error=provider";

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user resolved from the session cookies.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: User,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let app_state = AppState::from_ref(state);
        match app_state.auth_context(jar).state() {
            AuthState::Authenticated(user) => Ok(Self { user }),
            AuthState::Resolving | AuthState::Unauthenticated => Err(StatusCode::UNAUTHORIZED),
        }
    }
}

// =============================================================================
// JSON API
// =============================================================================

/// `{error, message, retryable}` body with the status mapped from the variant.
pub(crate) fn error_response(err: &AuthError) -> Response {
    let body = serde_json::json!({
        "error": err.error_code(),
        "message": err.message(),
        "retryable": err.retryable(),
    });
    (err.status(), Json(body)).into_response()
}

/// Unwrap a JSON body, answering malformed or mistyped requests in the API's
/// error shape instead of axum's plain-text rejection.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "rejected JSON body");
        error_response(&AuthError::validation("Invalid request body"))
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginBody {
    email: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignupBody {
    name: String,
    email: String,
    password: String,
    confirm_password: String,
}

/// `POST /api/auth/login`: verify credentials, set session cookies.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> Response {
    let body = match json_body(body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let ctx = state.auth_context(jar);
    let result = ctx.login(&body.email, &body.password).await;
    match result {
        Ok(user) => {
            let jar = ctx.into_store().into_jar();
            (jar, Json(serde_json::json!({ "user": user.without_token() }))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// `POST /api/auth/signup`: register, then sign in as the new account.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<SignupBody>, JsonRejection>,
) -> Response {
    let body = match json_body(body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let ctx = state.auth_context(jar);
    let result = ctx
        .signup(&body.name, &body.email, &body.password, &body.confirm_password)
        .await;
    match result {
        Ok(user) => {
            let jar = ctx.into_store().into_jar();
            (StatusCode::CREATED, jar, Json(serde_json::json!({ "user": user.without_token() }))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// `POST /api/auth/logout`: clear cookies, best-effort remote sign-out.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let ctx = state.auth_context(jar);
    let redirect = ctx.logout().await;
    (ctx.into_store().into_jar(), Json(serde_json::json!({ "redirect": redirect })))
}

/// `GET /api/auth/me`: return current user.
pub async fn me(auth: AuthUser) -> Json<AuthView> {
    Json(AuthView { user: Some(auth.user.without_token()), loading: false })
}

// =============================================================================
// GOOGLE OAUTH
// =============================================================================

fn oauth_state_cookie(value: String, secure: bool, max_age: Duration) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

/// `GET /auth/google`: redirect to Google's consent page.
pub async fn google_redirect(State(state): State<AppState>) -> Response {
    let Some(config) = &state.google else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Google sign-in not configured").into_response();
    };

    let oauth_state = generate_token();
    let jar = CookieJar::new().add(oauth_state_cookie(oauth_state.clone(), state.cookies.secure, Duration::minutes(10)));
    (jar, Redirect::temporary(&config.authorize_url(&oauth_state))).into_response()
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// `GET /auth/google/callback`: verify state, exchange code, start a
/// provider session, redirect home.
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let Some(config) = &state.google else {
        return (StatusCode::SERVICE_UNAVAILABLE, "Google sign-in not configured").into_response();
    };
    let clear_state = oauth_state_cookie(String::new(), state.cookies.secure, Duration::ZERO);
    let fail = |jar: CookieJar| (jar.add(clear_state.clone()), Redirect::temporary(PROVIDER_FAILED_REDIRECT)).into_response();

    if let Some(error) = params.error.as_deref() {
        tracing::warn!(%error, "google consent denied");
        return fail(jar);
    }

    // Verify OAuth CSRF state from cookie.
    let expected_state = jar
        .get(OAUTH_STATE_COOKIE_NAME)
        .map(Cookie::value)
        .unwrap_or_default();
    let (Some(code), Some(callback_state)) = (params.code.as_deref(), params.state.as_deref()) else {
        return fail(jar);
    };
    if expected_state.is_empty() || expected_state != callback_state {
        tracing::warn!("google callback with invalid oauth state");
        return fail(jar);
    }

    let access_token = match provider::exchange_code(config, code).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), retryable = e.retryable(), "oauth code exchange failed");
            return fail(jar);
        }
    };

    let google_user = match provider::fetch_google_user(config, &access_token).await {
        Ok(u) => u,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), retryable = e.retryable(), "google user fetch failed");
            return fail(jar);
        }
    };

    let ctx = state.auth_context(jar.clone());
    if let Err(e) = ctx.complete_provider_login(google_user.into_user(&access_token), &access_token) {
        tracing::error!(error = %e, "provider session persist failed");
        return fail(jar);
    }

    let jar = ctx.into_store().into_jar().add(clear_state);
    (jar, Redirect::temporary(&state.guard.home_path)).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
