use std::sync::Arc;

use super::*;
use crate::routes::app;
use crate::state::test_helpers::{
    MockVerifier, alice_verifier, cookie_header, location, no_redirect_client, set_cookies, spawn_http,
    test_app_state,
};

async fn serve(verifier: Arc<MockVerifier>) -> String {
    spawn_http(app(test_app_state(verifier))).await
}

async fn form_login(base: &str, password: &str, callback: &str) -> reqwest::Response {
    no_redirect_client()
        .post(format!("{base}/login"))
        .form(&[("email", "alice@example.com"), ("password", password), ("callbackUrl", callback)])
        .send()
        .await
        .unwrap()
}

// =============================================================================
// safe_callback
// =============================================================================

#[test]
fn safe_callback_accepts_local_paths_only() {
    assert_eq!(safe_callback("/dashboard/courses"), Some("/dashboard/courses"));
    assert_eq!(safe_callback("/"), Some("/"));
    for raw in ["", "dashboard", "//evil.example", "/\\evil.example", "https://evil.example", "/a\r\nb"] {
        assert_eq!(safe_callback(raw), None, "{raw:?}");
    }
}

// =============================================================================
// pages
// =============================================================================

#[tokio::test]
async fn landing_and_health_are_public() {
    let base = serve(Arc::new(MockVerifier::new())).await;
    let client = no_redirect_client();
    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("LearnFlow"));
    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn trailing_slash_auth_page_is_not_redirected_home() {
    let base = serve(Arc::new(MockVerifier::new())).await;
    let resp = no_redirect_client()
        .get(format!("{base}/login/"))
        .header("cookie", "token=tok")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_page_keeps_safe_callback_and_shows_provider_error() {
    let base = serve(Arc::new(MockVerifier::new())).await;
    let client = no_redirect_client();

    let html = client
        .get(format!("{base}/login?callbackUrl=%2Fdashboard%2Fcourses"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains(r#"name="callbackUrl" value="/dashboard/courses""#));

    let html = client
        .get(format!("{base}/login?callbackUrl=%2F%2Fevil.example&error=provider"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains(r#"name="callbackUrl" value="""#));
    assert!(html.contains("Google sign-in failed"));
}

#[tokio::test]
async fn form_login_redirects_to_callback_with_cookies() {
    let base = serve(Arc::new(alice_verifier())).await;
    let resp = form_login(&base, "correct-horse", "/dashboard/courses").await;
    assert_eq!(resp.status(), reqwest::StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/dashboard/courses");
    assert_eq!(set_cookies(&resp)["token"].0, "token-u-alice");
}

#[tokio::test]
async fn form_login_ignores_offsite_callback() {
    let base = serve(Arc::new(alice_verifier())).await;
    let resp = form_login(&base, "correct-horse", "//evil.example").await;
    assert_eq!(location(&resp), "/dashboard");
}

#[tokio::test]
async fn form_login_failure_rerenders_with_status() {
    let base = serve(Arc::new(alice_verifier())).await;
    let resp = form_login(&base, "wrong", "/dashboard").await;
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&resp).is_empty());
    let html = resp.text().await.unwrap();
    assert!(html.contains("Invalid email or password"));
    assert!(html.contains(r#"value="alice@example.com""#));
}

#[tokio::test]
async fn form_signup_mismatch_rerenders_without_network() {
    let verifier = Arc::new(MockVerifier::new());
    let base = serve(verifier.clone()).await;
    let resp = no_redirect_client()
        .post(format!("{base}/signup"))
        .form(&[("name", "Bob"), ("email", "bob@example.com"), ("password", "a"), ("confirmPassword", "b")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    assert!(resp.text().await.unwrap().contains("Passwords do not match"));
    assert_eq!(verifier.calls(), 0);
}

#[tokio::test]
async fn form_signup_success_lands_on_dashboard() {
    let base = serve(Arc::new(MockVerifier::new())).await;
    let resp = no_redirect_client()
        .post(format!("{base}/signup"))
        .form(&[("name", "Bob"), ("email", "bob@example.com"), ("password", "pw"), ("confirmPassword", "pw")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/dashboard");
}

// =============================================================================
// guard + dashboard
// =============================================================================

#[tokio::test]
async fn dashboard_without_token_redirects_to_login() {
    let base = serve(Arc::new(alice_verifier())).await;
    let client = no_redirect_client();

    let resp = client.get(format!("{base}/dashboard")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "/login?callbackUrl=%2Fdashboard");

    let resp = client.get(format!("{base}/dashboard/courses/7")).send().await.unwrap();
    assert_eq!(location(&resp), "/login?callbackUrl=%2Fdashboard%2Fcourses%2F7");
}

#[tokio::test]
async fn signed_in_user_sees_dashboard_and_skips_login_page() {
    let base = serve(Arc::new(alice_verifier())).await;
    let client = no_redirect_client();
    let cookies = cookie_header(&set_cookies(&form_login(&base, "correct-horse", "").await));

    let resp = client
        .get(format!("{base}/dashboard"))
        .header("cookie", &cookies)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Welcome back, Alice"));

    let resp = client
        .get(format!("{base}/login"))
        .header("cookie", &cookies)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp), "/dashboard");
}

#[tokio::test]
async fn dashboard_with_orphan_token_clears_and_redirects() {
    let base = serve(Arc::new(alice_verifier())).await;
    let resp = no_redirect_client()
        .get(format!("{base}/dashboard"))
        .header("cookie", "token=stale")
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/login?callbackUrl=%2Fdashboard");
    let cleared = set_cookies(&resp);
    assert_eq!(cleared["token"].0, "");
    assert_eq!(cleared["user"].0, "");
}

#[tokio::test]
async fn form_logout_returns_to_landing() {
    let verifier = Arc::new(alice_verifier());
    let base = serve(verifier.clone()).await;
    let cookies = cookie_header(&set_cookies(&form_login(&base, "correct-horse", "").await));

    let resp = no_redirect_client()
        .post(format!("{base}/logout"))
        .header("cookie", &cookies)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    assert_eq!(set_cookies(&resp)["token"].0, "");
    assert_eq!(verifier.sign_out_calls(), 1);
}
