//! `crs` - course registration from the terminal.
//!
//! Signs in against the registration API, keeps the access token in the
//! chosen scope, and lists or edits the API's collections.

mod cli;
mod commands;
mod output;

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Command};
use crs_core::{Config, SessionContext};

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` controls the level (default `warn`). With a log file, the
/// returned guard must live until exit so buffered lines are flushed.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr))
            .with(filter)
            .init();
        return Ok(None);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(filter)
        .init();
    Ok(Some(guard))
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let guard = match init_tracing(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = run(cli).await;
    // `exit` skips destructors, so flush the file writer first
    drop(guard);
    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?.with_env_overrides();
    if let Some(base) = cli.api_base {
        config.api_base = base;
    }
    debug!(api_base = %config.api_base, backend = ?config.token_backend, "Configuration loaded");

    let ctx = SessionContext::start(&config)?;
    info!(command = ?cli.command, "Running command");

    match cli.command {
        Command::Login { username, remember } => {
            commands::login(&ctx, &mut config, username, remember).await
        }
        Command::Logout => {
            commands::logout(ctx);
            Ok(())
        }
        Command::Whoami => commands::whoami(&ctx),
        Command::Refresh => commands::refresh(&ctx).await,
        Command::List {
            resource,
            search,
            json,
        } => commands::list(&ctx, resource, search.as_deref(), json).await,
        Command::Get { resource, id } => commands::get(&ctx, resource, &id).await,
        Command::Delete { resource, id } => commands::delete(&ctx, resource, &id).await,
        Command::Create { resource, file } => commands::create(&ctx, resource, &file).await,
        Command::Update { resource, id, file } => {
            commands::update(&ctx, resource, &id, &file).await
        }
        Command::CreateUser { role, file } => commands::create_user(&ctx, role, &file).await,
        Command::Sections { search } => commands::sections(&ctx, search.as_deref()).await,
        Command::Overview => commands::overview(&ctx).await,
        Command::ChangePassword => commands::change_password(&ctx).await,
        Command::Panels { role } => commands::panels(&ctx, role),
    }
}
