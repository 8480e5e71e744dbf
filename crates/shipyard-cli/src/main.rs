//! Command line front end: runs one tool invocation against the real backends.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        reason = "Allow for tests"
    )
)]

use std::io::{Write as _, stderr, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser as _;
use serde_json::{from_str, to_writer_pretty};
use tokio::fs;
use tokio::io::{AsyncReadExt as _, stdin};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

use shipyard_core::{ProgressChannel, SessionContext, ShipyardConfig, ToolInvocation, ToolResult};
use shipyard_tooling::{ToolDispatcher, ToolKind};

mod cli;
mod wiring;

use cli::{Cli, Commands};
use wiring::{Wiring, wire};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "shipyard=info".into()))
        .with(fmt::layer().with_writer(stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Dispatch {
            project,
            input,
            config,
        } => handle_dispatch(project, input, config).await?,
        Commands::Tools => handle_tools()?,
    }

    Ok(())
}

/// Wires the configured backends, runs the invocation, and prints the results.
async fn handle_dispatch(
    project: String,
    input: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let invocation = read_invocation(input.as_deref()).await?;
    if ToolKind::from_name(&invocation.name).is_none() {
        tracing::warn!("No tool named {:?}; nothing ran", invocation.name);
        return print_results(&[]);
    }

    let config = ShipyardConfig::load_or_default(config_path.as_deref())?;
    let Wiring { backends, client } = wire(&config)?;
    let dispatcher = ToolDispatcher::new(backends, &config.dispatch);
    tracing::info!("Dispatching {} ({})", invocation.name, invocation.id);

    let (progress, mut events) = ProgressChannel::new();
    let reporter = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            tracing::info!("{}", event.message);
        }
    });

    let session = SessionContext::new(project, Arc::new(progress), client);
    let outcome = dispatcher.dispatch(&invocation, &session).await;

    // Closing the last sender ends the reporter loop.
    drop(session);
    reporter.await?;

    print_results(&outcome?.into_results())
}

/// Writes `results` to stdout as a JSON array.
fn print_results(results: &[ToolResult]) -> Result<()> {
    let mut out = stdout().lock();
    to_writer_pretty(&mut out, results)?;
    writeln!(out)?;
    Ok(())
}

/// Reads one invocation from `path`, or stdin when `None`.
async fn read_invocation(path: Option<&Path>) -> Result<ToolInvocation> {
    let raw = match path {
        Some(file) => fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?,
        None => {
            let mut buffer = String::new();
            stdin().read_to_string(&mut buffer).await?;
            buffer
        }
    };

    from_str(&raw).context("Invocation must be a JSON object with id, name, and input")
}

/// Lists every tool name with its description.
fn handle_tools() -> Result<()> {
    let mut out = stdout().lock();
    for kind in ToolKind::ALL {
        writeln!(out, "{:<24} {}", kind.name(), kind.description())?;
    }
    Ok(())
}
