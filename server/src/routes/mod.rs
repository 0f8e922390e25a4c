//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the JSON auth API, the Google OAuth endpoints, and the
//! server-rendered form pages under a single Axum router. The route guard
//! runs in front of every route; `TraceLayer` wraps the whole stack.

pub mod auth;
pub mod pages;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::guard::route_guard;
use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::landing))
        .route("/login", get(pages::login_page).post(pages::login_submit))
        .route("/signup", get(pages::signup_page).post(pages::signup_submit))
        .route("/logout", post(pages::logout_submit))
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/{*rest}", get(pages::dashboard))
        .route("/auth/google", get(auth::google_redirect))
        .route("/auth/google/callback", get(auth::google_callback))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
