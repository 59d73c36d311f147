use anyhow::Result;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use std::sync::Arc;

use rodo_admin::client::RodoClient;
use rodo_admin::config::{CliArgs, Config};
use rodo_admin::navigation::LogNavigator;
use rodo_admin::session::SessionManager;
use rodo_admin::storage::SqliteStore;

/// RODO Admin - command-line client for the data-protection admin API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session
    Login {
        /// Administrator e-mail (prompted for when omitted)
        #[arg(long)]
        email: Option<String>,
    },

    /// Clear the stored session
    Logout,

    /// Show whether a session is stored
    Status,

    /// Issue an authenticated GET and print the JSON response
    Get {
        /// Path relative to the API base URL, e.g. /users
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::from_args(&cli.args)?;
    config.validate()?;

    // Initialize logging with the configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        base_url = %config.base_url,
        session_file = %config.session_file.display(),
        "Configuration loaded"
    );

    // Wire up storage, session, and the authenticated client
    let store = Arc::new(SqliteStore::open(&config.session_file)?);
    let session = Arc::new(SessionManager::new(store));
    let client = RodoClient::new(
        config.base_url.clone(),
        session.clone(),
        Arc::new(LogNavigator),
        config.http_connect_timeout,
        config.http_request_timeout,
    )?;

    match cli.command {
        Command::Login { email } => run_login(&client, email).await,
        Command::Logout => run_logout(&client),
        Command::Status => run_status(&session),
        Command::Get { path } => run_get(&client, &path).await,
    }
}

/// Prompt for missing credentials and sign in
async fn run_login(client: &RodoClient, email: Option<String>) -> Result<()> {
    let email: String = match email {
        Some(email) => email,
        None => Input::new().with_prompt("E-mail").interact_text()?,
    };

    let password: String = Password::new().with_prompt("Password").interact()?;

    let login = client.login(&email, &password).await?;

    println!("✅ Logged in as {}", email);
    if let Some(user) = login.user {
        println!("{}", serde_json::to_string_pretty(&user)?);
    }

    Ok(())
}

fn run_logout(client: &RodoClient) -> Result<()> {
    client.logout()?;
    println!("✅ Session cleared");
    Ok(())
}

fn run_status(session: &SessionManager) -> Result<()> {
    if session.is_authenticated()? {
        println!("Authenticated (session stored)");
    } else {
        println!("Not authenticated - run `rodo-admin login`");
    }
    Ok(())
}

/// GET a path through the full authenticated pipeline and print the result
async fn run_get(client: &RodoClient, path: &str) -> Result<()> {
    let response = client.get(path).await?;
    let status = response.status();
    let body = response.text().await?;

    // Pretty-print when the body is JSON, pass through otherwise
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", body),
    }

    if !status.is_success() {
        anyhow::bail!("Request failed with status {}", status);
    }

    Ok(())
}
