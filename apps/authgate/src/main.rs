use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{HttpAuthApi, SessionController, SessionStore, ViewState};
use storage::SqliteTokenStorage;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod interactive;
mod view;

#[derive(Parser, Debug)]
#[command(name = "authgate", about = "Sign in, register and manage an API session")]
struct Args {
    /// API base URL, e.g. http://localhost:3001/api
    #[arg(long)]
    server_url: Option<String>,
    /// Where the session token is kept (sqlite URL)
    #[arg(long)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the stored session and show the current view
    Status,
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Re-fetch the profile with the stored token
    Profile,
    /// Read commands from stdin until `quit`
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(database_url) = args.database_url {
        settings.database_url = database_url;
    }

    let storage = SqliteTokenStorage::new(&settings.database_url).await?;
    let store = SessionStore::for_base_url(Arc::new(storage), &settings.server_url)
        .with_context(|| format!("invalid server url '{}'", settings.server_url))?;
    let api = HttpAuthApi::new(&settings.server_url, settings.request_timeout())?;
    let controller =
        SessionController::with_options(Arc::new(api), store, settings.controller_options());

    let restored = controller.check_session_on_start().await;
    info!(
        server_url = %settings.server_url,
        logged_in = restored == ViewState::LoggedIn,
        "session checked"
    );

    let outcome = match args.command {
        Command::Status => Ok(()),
        Command::Login { email, password } => controller
            .login(&email, &password)
            .await
            .map(|_| ())
            .context("login failed"),
        Command::Register {
            name,
            email,
            password,
        } => controller
            .register(&name, &email, &password)
            .await
            .map(|_| ())
            .context("registration failed"),
        Command::Logout => {
            controller.logout().await;
            Ok(())
        }
        Command::Profile => controller
            .refresh_profile()
            .await
            .map(|_| ())
            .context("profile refresh failed"),
        Command::Interactive => return interactive::run(&controller).await,
    };

    println!("{}", view::render(&controller.snapshot().await));
    outcome
}
