//! Keygate - a terminal shell whose main surface is gated behind a
//! credential stored in the OS keychain.

mod terminal;

use std::sync::Arc;

use anyhow::{Context, Result};
use keygate_core::auth::{backend, KeyringStore};
use keygate_core::gate::{Presentation, SurfaceRegistry};
use keygate_core::{Commands, Completion, Config, GateState, SessionGate, Surface};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use terminal::{prompt, TerminalWindow};

/// Initialize the tracing subscriber, logging to a daily file so the
/// terminal stays free for the surfaces.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = config.cache_dir().ok()?.join("logs");
    let appender = tracing_appender::rolling::daily(log_dir, "keygate.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Some(guard)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let loaded = Config::load();
    let mut config = loaded.as_ref().cloned().unwrap_or_default();

    let _guard = init_tracing(&config);
    info!("Keygate starting");
    if let Err(e) = loaded {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    if let Ok(url) = std::env::var("KEYGATE_AUTH_URL") {
        config.auth_url = Some(url);
    }

    let surfaces = Arc::new(SurfaceRegistry::<TerminalWindow>::new());
    let backend = backend::from_config(&config).context("Failed to set up authentication backend")?;
    let gate = SessionGate::new(&config, Arc::new(KeyringStore), backend, surfaces.clone());
    let commands = Commands::new(gate);

    commands.gate().start().await;

    loop {
        let keep_running = match commands.gate().state() {
            GateState::LoginVisible => login_surface(&commands).await?,
            GateState::MainVisible => main_surface(&commands, surfaces.as_ref()).await?,
            GateState::NoSurface => reopen(&commands).await?,
        };
        if !keep_running {
            break;
        }
    }

    info!("Keygate shutting down");
    Ok(())
}

/// Returns `false` when the user asked to quit.
async fn login_surface(commands: &Commands) -> Result<bool> {
    let suggested = match std::env::var("KEYGATE_USERNAME") {
        Ok(username) => username,
        Err(_) => commands.get_stored_username().await,
    };

    let label = if suggested.is_empty() {
        "Username (:q to quit): ".to_string()
    } else {
        format!("Username [{}] (:q to quit): ", suggested)
    };
    let Some(input) = prompt(&label)? else {
        return Ok(false);
    };
    if input == ":q" {
        return Ok(false);
    }
    let username = if input.is_empty() { suggested } else { input };

    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;
    let remember = matches!(
        prompt("Remember username? [y/N]: ")?.as_deref(),
        Some("y") | Some("Y")
    );

    println!("Signing in...");
    let response = commands.login(&username, &password, remember).await;
    println!("{}", response.message);
    Ok(true)
}

async fn main_surface(commands: &Commands, surfaces: &dyn Presentation) -> Result<bool> {
    let Some(choice) =
        prompt("[m] machine code  [t] token  [c] clear token  [l] logout  [w] close window  [q] quit: ")?
    else {
        return Ok(false);
    };

    match choice.as_str() {
        "m" => {
            let response = commands.get_machine_code();
            if let Some(code) = response.machine_code {
                println!("Machine code: {}", code);
            }
            if let Some(message) = response.message {
                println!("{}", message);
            }
        }
        "t" => {
            let token = commands.get_auth_token().await;
            if token.is_empty() {
                println!("No token stored");
            } else {
                println!("Token: {}", token);
            }
        }
        "c" => match commands.clear_auth_token().await {
            Completion::Completed => println!("Token cleared"),
            Completion::Failed => println!("Could not clear token"),
        },
        "l" => {
            commands.logout().await;
        }
        "w" => surfaces.close(Surface::Main),
        "q" => return Ok(false),
        other => println!("Unknown choice: {}", other),
    }
    Ok(true)
}

/// All surfaces closed: wait for the user to re-activate the application.
async fn reopen(commands: &Commands) -> Result<bool> {
    match prompt("No windows open. Press Enter to reactivate, q to quit: ")?.as_deref() {
        None | Some("q") => Ok(false),
        Some(_) => {
            commands.gate().reactivate().await;
            Ok(true)
        }
    }
}
