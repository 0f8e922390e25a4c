//! HTML pages for the form-based flow.
//!
//! Pages are static files with `{{PLACEHOLDER}}` slots filled by string
//! replacement. Every interpolated value goes through [`escape_html`].

use crate::types::User;

const LANDING_TEMPLATE: &str = include_str!("../templates/landing.html");
const LOGIN_TEMPLATE: &str = include_str!("../templates/login.html");
const SIGNUP_TEMPLATE: &str = include_str!("../templates/signup.html");
const DASHBOARD_TEMPLATE: &str = include_str!("../templates/dashboard.html");

const PROVIDER_LINK: &str = r#"<p><a href="/auth/google">Continue with Google</a></p>"#;

/// Escape text for HTML bodies and double-quoted attributes. Braces are
/// escaped too so user input can never form a placeholder.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(c),
        }
    }
    out
}

/// Values echoed back into a login or signup form.
#[derive(Debug, Default, Clone)]
pub struct FormPage<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub callback_url: &'a str,
    pub error: Option<&'a str>,
    pub provider_enabled: bool,
}

impl FormPage<'_> {
    fn fill(&self, template: &str) -> String {
        let error = self
            .error
            .map(|e| format!(r#"<p class="error" role="alert">{}</p>"#, escape_html(e)))
            .unwrap_or_default();
        let provider = if self.provider_enabled { PROVIDER_LINK } else { "" };
        template
            .replace("{{NAME}}", &escape_html(self.name))
            .replace("{{EMAIL}}", &escape_html(self.email))
            .replace("{{CALLBACK}}", &escape_html(self.callback_url))
            .replace("{{PROVIDER}}", provider)
            .replace("{{ERROR}}", &error)
    }
}

#[must_use]
pub fn render_landing() -> String {
    LANDING_TEMPLATE.to_owned()
}

#[must_use]
pub fn render_login(page: &FormPage<'_>) -> String {
    page.fill(LOGIN_TEMPLATE)
}

#[must_use]
pub fn render_signup(page: &FormPage<'_>) -> String {
    page.fill(SIGNUP_TEMPLATE)
}

#[must_use]
pub fn render_dashboard(user: &User) -> String {
    DASHBOARD_TEMPLATE
        .replace("{{NAME}}", &escape_html(&user.name))
        .replace("{{EMAIL}}", &escape_html(&user.email))
}

#[cfg(test)]
#[path = "templates_test.rs"]
mod tests;
