//! Page routes: server-rendered landing, login, signup, and dashboard.
//!
//! Form posts follow post/redirect/get: success answers 303 to the
//! sanitized `callbackUrl`, failure re-renders the form with the error
//! message and the status mapped from the error.

use axum::Form;
use axum::extract::{Query, State};
use axum::http::Uri;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::services::context::AuthState;
use crate::services::session::SessionStore;
use crate::state::AppState;
use crate::templates::{self, FormPage};

const PROVIDER_FAILED_MESSAGE: &str = "Google sign-in failed. Please try again.";

/// Accept `raw` only as a local absolute path, so `callbackUrl` cannot
/// redirect off-site.
#[must_use]
pub fn safe_callback(raw: &str) -> Option<&str> {
    let local = raw.starts_with('/') && !raw.starts_with("//") && !raw.starts_with("/\\");
    (local && !raw.chars().any(char::is_control)).then_some(raw)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageQuery {
    callback_url: String,
    error: String,
}

impl PageQuery {
    fn error_message(&self) -> Option<&'static str> {
        (self.error == "provider").then_some(PROVIDER_FAILED_MESSAGE)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginForm {
    email: String,
    password: String,
    callback_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignupForm {
    name: String,
    email: String,
    password: String,
    confirm_password: String,
    callback_url: String,
}

/// `GET /`
pub async fn landing() -> Html<String> {
    Html(templates::render_landing())
}

/// `GET /login`
pub async fn login_page(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Html<String> {
    Html(templates::render_login(&FormPage {
        callback_url: safe_callback(&query.callback_url).unwrap_or_default(),
        error: query.error_message(),
        provider_enabled: state.google.is_some(),
        ..FormPage::default()
    }))
}

/// `GET /signup`
pub async fn signup_page(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Html<String> {
    Html(templates::render_signup(&FormPage {
        callback_url: safe_callback(&query.callback_url).unwrap_or_default(),
        error: query.error_message(),
        provider_enabled: state.google.is_some(),
        ..FormPage::default()
    }))
}

/// `POST /login`
pub async fn login_submit(State(state): State<AppState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    let ctx = state.auth_context(jar);
    let result = ctx.login(&form.email, &form.password).await;
    let callback = safe_callback(&form.callback_url);
    match result {
        Ok(_) => {
            let target = callback.unwrap_or(&state.guard.home_path);
            (ctx.into_store().into_jar(), Redirect::to(target)).into_response()
        }
        Err(e) => {
            let message = e.message();
            let page = FormPage {
                email: &form.email,
                callback_url: callback.unwrap_or_default(),
                error: Some(&message),
                provider_enabled: state.google.is_some(),
                ..FormPage::default()
            };
            (e.status(), Html(templates::render_login(&page))).into_response()
        }
    }
}

/// `POST /signup`
pub async fn signup_submit(State(state): State<AppState>, jar: CookieJar, Form(form): Form<SignupForm>) -> Response {
    let ctx = state.auth_context(jar);
    let result = ctx
        .signup(&form.name, &form.email, &form.password, &form.confirm_password)
        .await;
    let callback = safe_callback(&form.callback_url);
    match result {
        Ok(_) => {
            let target = callback.unwrap_or(&state.guard.home_path);
            (ctx.into_store().into_jar(), Redirect::to(target)).into_response()
        }
        Err(e) => {
            let message = e.message();
            let page = FormPage {
                name: &form.name,
                email: &form.email,
                callback_url: callback.unwrap_or_default(),
                error: Some(&message),
                provider_enabled: state.google.is_some(),
            };
            (e.status(), Html(templates::render_signup(&page))).into_response()
        }
    }
}

/// `POST /logout`
pub async fn logout_submit(State(state): State<AppState>, jar: CookieJar) -> Response {
    let ctx = state.auth_context(jar);
    let landing = ctx.logout().await;
    (ctx.into_store().into_jar(), Redirect::to(&landing)).into_response()
}

/// `GET /dashboard` and everything below it.
///
/// The guard only checks that a token cookie exists. A token whose profile
/// cookie is missing or expired lands here unauthenticated; both cookies
/// are cleared and the user is sent to log in.
pub async fn dashboard(State(state): State<AppState>, jar: CookieJar, uri: Uri) -> Response {
    let ctx = state.auth_context(jar);
    match ctx.state() {
        AuthState::Authenticated(user) => Html(templates::render_dashboard(&user)).into_response(),
        AuthState::Resolving | AuthState::Unauthenticated => {
            let mut store = ctx.into_store();
            store.clear();
            let location = state.guard.login_redirect(uri.path());
            (store.into_jar(), Redirect::temporary(&location)).into_response()
        }
    }
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
