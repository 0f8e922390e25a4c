use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use learnflow::error::AuthError;
use learnflow::guard::{GuardDecision, GuardRules};
use learnflow::services::context::{AuthContext, AuthState, SessionPolicy};
use learnflow::services::identity::IdentityClient;
use learnflow::services::session::FileSessionStore;
use learnflow::types::User;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("not signed in; run `learnflow-cli login` first")]
    NotSignedIn,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "learnflow-cli", about = "LearnFlow sign-in and session CLI")]
struct Cli {
    /// Identity backend base URL.
    #[arg(long, env = "LEARNFLOW_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    #[arg(long, env = "LEARNFLOW_SESSION_FILE", default_value = ".learnflow/session.json")]
    session_file: PathBuf,

    #[arg(long, env = "LEARNFLOW_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LEARNFLOW_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "LEARNFLOW_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Clear the local session and revoke it on the backend.
    Logout,
    /// Print the signed-in user.
    Whoami,
    /// Show what the route guard would do with a navigation to `path`.
    CheckRoute { path: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let verifier = IdentityClient::new(&cli.api_url, Duration::from_secs(cli.timeout_secs))?;
    let ctx = AuthContext::new(
        Arc::new(verifier),
        FileSessionStore::new(&cli.session_file),
        SessionPolicy::default(),
    );
    ctx.resolve();

    match cli.command {
        Command::Login { email, password } => {
            let user = ctx.login(&email, &password).await?;
            eprintln!("signed in as {}", user.email);
            print_user(&user)
        }
        Command::Signup { name, email, password, confirm_password } => {
            let user = ctx.signup(&name, &email, &password, &confirm_password).await?;
            eprintln!("account created for {}", user.email);
            print_user(&user)
        }
        Command::Logout => {
            let landing = ctx.logout().await;
            eprintln!("signed out");
            println!("{landing}");
            Ok(())
        }
        Command::Whoami => match ctx.state() {
            AuthState::Authenticated(user) => print_user(&user),
            AuthState::Resolving | AuthState::Unauthenticated => Err(CliError::NotSignedIn),
        },
        Command::CheckRoute { path } => {
            let token = ctx.session().map(|s| s.token);
            println!("{}", describe(&GuardRules::default().decide(&path, token.as_deref())));
            Ok(())
        }
    }
}

fn print_user(user: &User) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(&user.without_token())?);
    Ok(())
}

fn describe(decision: &GuardDecision) -> String {
    match decision {
        GuardDecision::Allow => "allow".to_owned(),
        GuardDecision::Redirect(location) => format!("redirect {location}"),
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
