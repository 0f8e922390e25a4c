use super::*;
use crate::types::AuthMethod;

#[test]
fn escape_html_covers_markup_and_placeholders() {
    assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    assert_eq!(escape_html("{{ERROR}}"), "&#123;&#123;ERROR&#125;&#125;");
    assert_eq!(escape_html("plain"), "plain");
}

#[test]
fn login_page_echoes_email_and_error() {
    let html = render_login(&FormPage {
        email: "alice@example.com",
        callback_url: "/dashboard/courses",
        error: Some("Invalid email or password"),
        ..FormPage::default()
    });
    assert!(html.contains(r#"value="alice@example.com""#));
    assert!(html.contains(r#"value="/dashboard/courses""#));
    assert!(html.contains("Invalid email or password"));
    assert!(!html.contains("{{"));
    assert!(!html.contains("/auth/google"));
}

#[test]
fn login_page_links_provider_when_enabled() {
    let html = render_login(&FormPage { provider_enabled: true, ..FormPage::default() });
    assert!(html.contains(r#"href="/auth/google""#));
    assert!(!html.contains(r#"class="error""#));
}

#[test]
fn signup_page_escapes_user_input() {
    let html = render_signup(&FormPage {
        name: "<script>alert(1)</script>",
        email: "{{ERROR}}",
        error: Some("Passwords do not match"),
        ..FormPage::default()
    });
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert_eq!(html.matches("Passwords do not match").count(), 1);
    assert!(html.contains(r#"name="confirmPassword""#));
}

#[test]
fn dashboard_greets_user() {
    let user = User {
        id: "u1".into(),
        name: "Ada & Co".into(),
        email: "ada@example.com".into(),
        access_token: None,
        auth_method: AuthMethod::Password,
    };
    let html = render_dashboard(&user);
    assert!(html.contains("Welcome back, Ada &amp; Co"));
    assert!(html.contains("ada@example.com"));
    assert!(html.contains(r#"action="/logout""#));
}

#[test]
fn landing_links_to_auth_pages() {
    let html = render_landing();
    assert!(html.contains(r#"href="/login""#));
    assert!(html.contains(r#"href="/signup""#));
}
