//! sessiongate - command-line front-end for the session subsystem.
//!
//! Logs in against the configured token endpoint, keeps the issued token in
//! the chosen storage backend, and reports which routes a navigation would
//! reach with the current session.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sessiongate_core::api::SessionInfo;
use sessiongate_core::auth::AuthError;
use sessiongate_core::routes::Admission;
use sessiongate_core::{AuthContext, Config, StorageBackend};

/// Log file name inside `--log-dir`
const LOG_FILE: &str = "sessiongate.log";

#[derive(Parser)]
#[command(name = "sessiongate", version, about = "Log in, log out and check route admission")]
struct Cli {
    /// Base URL of the token endpoint
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Where to keep the session token (file, keyring, memory, none)
    #[arg(long, global = true)]
    storage: Option<StorageBackend>,

    /// Also write logs to a file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Exchange username and password for a session token
    Login {
        #[arg(long, short, env = "SESSIONGATE_USERNAME")]
        username: Option<String>,
    },
    /// End the current session
    Logout,
    /// Show whether a session is held
    Status,
    /// Evaluate route admission for one or more paths
    Navigate {
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_dir.as_ref());

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(api_base) = cli.api_base {
        config.api_base = api_base;
    }
    if let Some(storage) = cli.storage {
        config.storage_backend = storage;
    }
    info!(api_base = %config.api_base, storage = %config.storage_backend, "sessiongate starting");

    let storage = config.storage().context("Failed to open credential storage")?;
    let ctx = AuthContext::new(&config, storage).context("Failed to create HTTP client")?;

    let result = match cli.command {
        Command::Login { username } => login(&ctx, username).await,
        Command::Logout => {
            ctx.logout();
            println!("Logged out.");
            Ok(ExitCode::SUCCESS)
        }
        Command::Status => {
            status(&ctx);
            Ok(ExitCode::SUCCESS)
        }
        Command::Navigate { paths } => {
            for path in paths {
                match ctx.navigate(&path) {
                    Admission::Admitted => println!("{} -> admitted", path),
                    Admission::Redirected(target) => println!("{} -> redirect {}", path, target),
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    };

    ctx.shutdown();
    result
}

/// A rejected login is reported once and exits non-zero; only setup
/// failures propagate as errors.
async fn login(ctx: &AuthContext, username: Option<String>) -> Result<ExitCode> {
    let username = match username {
        Some(username) => username,
        None => prompt_username()?,
    };
    let password = match std::env::var("SESSIONGATE_PASSWORD") {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("Password: ")?,
    };

    println!("Authenticating...");
    let (message, succeeded) = login_report(&ctx.login(&username, &password).await);
    if succeeded {
        println!("{}", message);
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{}", message);
        Ok(ExitCode::FAILURE)
    }
}

/// Line to show for a login attempt, and whether it succeeded
fn login_report(result: &std::result::Result<SessionInfo, AuthError>) -> (String, bool) {
    match result {
        Ok(info) => (
            format!(
                "Login successful ({} token).",
                info.token_type.as_deref().unwrap_or("access")
            ),
            true,
        ),
        Err(e) => (e.user_message(), false),
    }
}

fn prompt_username() -> Result<String> {
    print!("Username: ");
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    Ok(username.trim().to_string())
}

fn status(ctx: &AuthContext) {
    let session = ctx.session();
    if session.is_authenticated {
        println!("Authenticated.");
    } else {
        println!("Not authenticated.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_navigate_with_global_flags() {
        let cli = Cli::try_parse_from([
            "sessiongate",
            "navigate",
            "/dashboard",
            "/login",
            "--storage",
            "memory",
            "--api-base",
            "http://localhost:9000",
        ])
        .unwrap();

        assert_eq!(cli.storage, Some(StorageBackend::Memory));
        assert_eq!(cli.api_base.as_deref(), Some("http://localhost:9000"));
        match cli.command {
            Command::Navigate { paths } => assert_eq!(paths, vec!["/dashboard", "/login"]),
            _ => panic!("expected navigate"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_storage() {
        assert!(Cli::try_parse_from(["sessiongate", "status", "--storage", "tape"]).is_err());
    }

    #[test]
    fn test_login_report() {
        let info = SessionInfo::from_body(r#"{"access_token":"T1","token_type":"bearer"}"#).unwrap();
        assert_eq!(
            login_report(&Ok(info)),
            ("Login successful (bearer token).".to_string(), true)
        );

        let (message, succeeded) = login_report(&Err(AuthError::MissingCredentials));
        assert!(!succeeded);
        assert_eq!(message, AuthError::MissingCredentials.user_message());
    }

    #[test]
    fn test_navigate_requires_a_path() {
        assert!(Cli::try_parse_from(["sessiongate", "navigate"]).is_err());
    }
}
