//! gemgate - password-gated Gemini chat and image proxy
//!
//! A Rust HTTP server that:
//! - Forwards chat and image generation to the Gemini API on /api/*
//! - Serves the chat and image pages behind a shared-password cookie gate
//! - Offers the same conversation flow in the terminal (`gemgate chat`)

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod chat_commands;
mod cli;
mod config_commands;
mod router;
mod server_utils;

use cli::{Cli, Commands, ConfigCommands};
use gemgate_core::modules::config::load_config;
use gemgate_core::proxy::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        None => run_server(cli.port).await,
        Some(Commands::Serve { port }) => run_server(port.or(cli.port)).await,
        Some(Commands::Chat(args)) => chat_commands::run_chat(args).await,
        Some(Commands::Config(ConfigCommands::Show { json })) => config_commands::show_config(json),
    }
}

async fn run_server(port_override: Option<u16>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(port) = port_override {
        config.server.port = port;
    }

    info!("🚀 gemgate {} starting...", option_env!("GIT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION")));
    if !config.gate.is_enabled() {
        warn!("⚠️ SITE_PASSWORD not set, pages are served without the access gate");
    }
    if config.gateway.api_key.is_none() {
        info!("No server API key configured, callers must supply their own");
    }

    let addr = config.server.bind_address();
    let state = AppState::new(config)?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 Server listening on http://{}", addr);
    info!("🔌 API available at http://{}/api/", addr);

    axum::serve(listener, app).with_graceful_shutdown(server_utils::shutdown_signal()).await?;

    info!("✅ Server stopped");
    Ok(())
}
