use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use super::*;
use crate::state::test_helpers::spawn_http;

// =============================================================================
// classify_status
// =============================================================================

#[test]
fn classify_401_is_invalid_credentials() {
    let err = classify_status(401, "", LOGIN_FALLBACK);
    assert_eq!(err, AuthError::InvalidCredentials("Invalid email or password".into()));
}

#[test]
fn classify_404_is_user_not_found() {
    assert_eq!(classify_status(404, "{}", LOGIN_FALLBACK), AuthError::UserNotFound("User not found".into()));
}

#[test]
fn classify_5xx_is_server_error() {
    for status in [500, 502, 503, 599] {
        assert!(matches!(classify_status(status, "", LOGIN_FALLBACK), AuthError::ServerError(_)));
    }
}

#[test]
fn classify_other_status_passes_backend_message_through() {
    let err = classify_status(409, r#"{"message":"Email already registered"}"#, SIGNUP_FALLBACK);
    assert_eq!(err, AuthError::Unexpected("Email already registered".into()));
}

#[test]
fn classify_other_status_without_message_uses_fallback() {
    assert_eq!(classify_status(422, "not json", SIGNUP_FALLBACK), AuthError::Unexpected(SIGNUP_FALLBACK.into()));
    assert_eq!(
        classify_status(400, r#"{"message":"  "}"#, LOGIN_FALLBACK),
        AuthError::Unexpected(LOGIN_FALLBACK.into())
    );
}

// =============================================================================
// parse_auth_response
// =============================================================================

#[test]
fn parse_accepts_user_and_token() {
    let body = r#"{"user":{"_id":"u1","name":"Alice","email":"alice@example.com"},"access_token":"tok"}"#;
    let issued = parse_auth_response(body).unwrap();
    assert_eq!(issued.token, "tok");
    assert_eq!(issued.user.id, "u1");
    assert!(issued.user.access_token.is_none());
}

#[test]
fn parse_missing_token_is_invalid_credentials() {
    let body = r#"{"user":{"id":"u1","name":"Alice","email":"alice@example.com"}}"#;
    assert_eq!(parse_auth_response(body), Err(AuthError::InvalidCredentials("Invalid credentials".into())));
    let body = r#"{"user":{"id":"u1","name":"Alice","email":"alice@example.com"},"access_token":""}"#;
    assert!(matches!(parse_auth_response(body), Err(AuthError::InvalidCredentials(_))));
}

#[test]
fn parse_garbage_is_unexpected() {
    assert!(matches!(parse_auth_response("<html>"), Err(AuthError::Unexpected(_))));
}

// =============================================================================
// IdentityClient over HTTP
// =============================================================================

fn user_json() -> Value {
    json!({"id": "u1", "name": "Alice", "email": "alice@example.com"})
}

async fn fake_backend() -> String {
    let router = Router::new()
        .route(
            "/auth/login",
            post(|Json(body): Json<Value>| async move {
                let email = body["email"].as_str().unwrap_or_default().to_owned();
                let password = body["password"].as_str().unwrap_or_default().to_owned();
                match (email.as_str(), password.as_str()) {
                    ("alice@example.com", "correct-horse") => {
                        (StatusCode::OK, Json(json!({"user": user_json(), "access_token": "tok-1"})))
                    }
                    ("alice@example.com", _) => (StatusCode::UNAUTHORIZED, Json(json!({"message": "nope"}))),
                    ("down@example.com", _) => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({}))),
                    ("slow@example.com", _) => {
                        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                        (StatusCode::OK, Json(json!({"user": user_json(), "access_token": "late"})))
                    }
                    ("tokenless@example.com", _) => (StatusCode::OK, Json(json!({"user": user_json()}))),
                    _ => (StatusCode::NOT_FOUND, Json(json!({"message": "no such user"}))),
                }
            }),
        )
        .route(
            "/auth/register",
            post(|Json(body): Json<Value>| async move {
                if body["email"] == "taken@example.com" {
                    return (StatusCode::CONFLICT, Json(json!({"message": "Email already registered"})));
                }
                if body.get("confirmPassword").is_some() || body.get("confirm_password").is_some() {
                    return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({})));
                }
                let user = json!({"id": "u2", "name": body["name"], "email": body["email"]});
                (StatusCode::CREATED, Json(json!({"user": user, "access_token": "tok-2"})))
            }),
        )
        .route(
            "/auth/logout",
            post(|headers: HeaderMap| async move {
                match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                    Some("Bearer tok-1") => StatusCode::NO_CONTENT,
                    _ => StatusCode::UNAUTHORIZED,
                }
            }),
        );
    spawn_http(router).await
}

async fn client() -> IdentityClient {
    let base = fake_backend().await;
    IdentityClient::new(&format!("{base}/"), Duration::from_millis(100)).unwrap()
}

#[tokio::test]
async fn base_url_trailing_slash_is_trimmed() {
    let c = IdentityClient::new("http://id.example.test//", Duration::from_secs(1)).unwrap();
    assert_eq!(c.base_url(), "http://id.example.test");
}

#[tokio::test]
async fn login_success_returns_session() {
    let c = client().await;
    let creds = Credentials::new("Alice@Example.com", "correct-horse").unwrap();
    let issued = c.login(&creds).await.unwrap();
    assert_eq!(issued.token, "tok-1");
    assert_eq!(issued.user.email, "alice@example.com");
}

#[tokio::test]
async fn login_wrong_password_is_invalid_credentials() {
    let c = client().await;
    let creds = Credentials::new("alice@example.com", "wrong").unwrap();
    let err = c.login(&creds).await.unwrap_err();
    assert_eq!(err.message(), "Invalid email or password");
}

#[tokio::test]
async fn login_unknown_user_is_not_found() {
    let c = client().await;
    let creds = Credentials::new("bob@example.com", "pw").unwrap();
    assert!(matches!(c.login(&creds).await, Err(AuthError::UserNotFound(_))));
}

#[tokio::test]
async fn login_backend_down_is_server_error() {
    let c = client().await;
    let creds = Credentials::new("down@example.com", "pw").unwrap();
    let err = c.login(&creds).await.unwrap_err();
    assert!(matches!(err, AuthError::ServerError(_)));
    assert_eq!(err.message(), "Server error. Please try again later.");
}

#[tokio::test]
async fn login_slow_backend_times_out() {
    let c = client().await;
    let creds = Credentials::new("slow@example.com", "pw").unwrap();
    let err = c.login(&creds).await.unwrap_err();
    assert_eq!(err, AuthError::Timeout("Connection timeout. Please try again.".into()));
}

#[tokio::test]
async fn login_2xx_without_token_is_invalid_credentials() {
    let c = client().await;
    let creds = Credentials::new("tokenless@example.com", "pw").unwrap();
    assert!(matches!(c.login(&creds).await, Err(AuthError::InvalidCredentials(_))));
}

#[tokio::test]
async fn signup_sends_registration_without_confirmation() {
    let c = client().await;
    let reg = Registration::new("Bob", "bob@example.com", "pw123456", "pw123456").unwrap();
    let issued = c.signup(&reg).await.unwrap();
    assert_eq!(issued.token, "tok-2");
    assert_eq!(issued.user.name, "Bob");
}

#[tokio::test]
async fn signup_conflict_passes_message_through() {
    let c = client().await;
    let reg = Registration::new("Bob", "taken@example.com", "pw", "pw").unwrap();
    let err = c.signup(&reg).await.unwrap_err();
    assert_eq!(err, AuthError::Unexpected("Email already registered".into()));
}

#[tokio::test]
async fn sign_out_sends_bearer_token() {
    let c = client().await;
    c.sign_out("tok-1").await.unwrap();
    assert!(matches!(c.sign_out("other").await, Err(AuthError::InvalidCredentials(_))));
}

#[tokio::test]
async fn unreachable_backend_is_unexpected() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let c = IdentityClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let creds = Credentials::new("alice@example.com", "pw").unwrap();
    assert_eq!(c.login(&creds).await.unwrap_err(), AuthError::Unexpected(LOGIN_FALLBACK.into()));
}
