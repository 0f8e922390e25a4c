use std::sync::Arc;

use learnflow::config::AppConfig;
use learnflow::error::ErrorCode;
use learnflow::routes;
use learnflow::services::identity::IdentityClient;
use learnflow::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, code = e.error_code(), "invalid configuration");
    })?;
    let verifier = IdentityClient::new(&config.identity_url, config.identity_timeout)?;
    tracing::info!(
        identity_url = verifier.base_url(),
        timeout_secs = config.identity_timeout.as_secs(),
        "identity client initialized"
    );
    if config.google.is_none() {
        tracing::warn!("GOOGLE_CLIENT_ID/SECRET/REDIRECT_URI not set; Google sign-in disabled");
    }

    let state = AppState::new(Arc::new(verifier), &config);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(port = config.port, "learnflow listening");
    axum::serve(listener, app).await?;
    Ok(())
}
