//! mcn-guide - museum visit companion service
//!
//! Serves the artwork catalog and thematic routes, unlocks artwork detail
//! per visitor session once the artwork's QR code is scanned, tracks route
//! progress, and relays the chat assistant.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use mcn_common::chat::ChatAssistant;
use mcn_common::config::{ConfigOverrides, TomlConfig};
use mcn_common::Catalog;
use mcn_guide::chat_client::{GatewayChatClient, UnavailableAssistant};
use mcn_guide::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for mcn-guide
#[derive(Parser, Debug)]
#[command(name = "mcn-guide")]
#[command(about = "Museum visit companion service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "MCN_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "MCN_BIND_ADDR")]
    bind_addr: Option<String>,

    /// Catalog dataset (JSON) replacing the built-in collection
    #[arg(long, env = "MCN_CATALOG")]
    catalog: Option<PathBuf>,

    /// Base URL for shareable artwork links
    #[arg(long)]
    public_base_url: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Chat gateway URL
    #[arg(long)]
    chat_endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let config = config
        .with_overrides(ConfigOverrides {
            bind_addr: args.bind_addr,
            public_base_url: args.public_base_url,
            catalog_path: args.catalog,
            log_level: args.log_level,
            chat_endpoint: args.chat_endpoint,
        })
        .context("Invalid configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("mcn_guide={0},mcn_common={0},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting MCN Guide v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if source.is_fallback() {
        warn!("Configuration: {}", source);
    } else {
        info!("Configuration: {}", source);
    }

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => Catalog::builtin().context("Failed to load built-in catalog")?,
    };
    let chat: Arc<dyn ChatAssistant> = match GatewayChatClient::from_config(&config.chat)
        .context("Failed to create chat gateway client")?
    {
        Some(client) => {
            info!("Chat gateway: {}", client.endpoint());
            Arc::new(client)
        }
        None => {
            warn!("No chat endpoint configured; chat assistant unavailable");
            Arc::new(UnavailableAssistant)
        }
    };

    let state = AppState::new(
        Arc::new(catalog),
        chat,
        config.public_base_url(),
        &config.session,
    );
    let sweeper = state
        .sessions
        .spawn_sweeper(Duration::from_secs(config.session.sweep_interval_secs));

    let app = build_router(state);

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_addr))?;
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    sweeper.abort();
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
