//! sm-gateway: Social Gateway Main Binary
//!
//! Main entry point for the Social Gateway REST API.
//!
//! Usage:
//!   sm-gateway           - Start the HTTP API
//!   sm-gateway --help    - Show help

use std::sync::Arc;

use sm_api::AppState;
use sm_core::{Config, Pacer};
use sm_instagram::{InstagramService, PrivateApiFactory};
use sm_tiktok::{TikTokService, TikTokWebBackend};
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    /// Serve the HTTP API
    Server,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("sm-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting sm-gateway...");
    tracing::info!(
        "TikTok MS_TOKEN: {}",
        if config.tiktok.token_configured() { "configured" } else { "not set" }
    );
    tracing::info!(
        "Instagram login: {}",
        if config.instagram.has_session_id() {
            "session id"
        } else if config.instagram.has_credentials() {
            "username/password"
        } else {
            "not configured"
        }
    );
    tracing::info!(
        "Anti-detection: {} (delay {:.1}-{:.1}s)",
        config.pacing.anti_detection,
        config.pacing.min_delay,
        config.pacing.max_delay
    );

    run_server(config).await
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("sm-gateway - TikTok & Instagram REST gateway");
    println!();
    println!("Usage:");
    println!("  sm-gateway           Start the HTTP API");
    println!("  sm-gateway --help    Show this help message");
    println!("  sm-gateway --version Show version");
    println!();
    println!("Environment Variables:");
    println!("  MS_TOKEN                TikTok msToken cookie");
    println!("  PROXY_URL               Proxy for TikTok requests");
    println!("  INSTAGRAM_SESSION_ID    Instagram sessionid cookie (preferred)");
    println!("  INSTAGRAM_USERNAME      Instagram login");
    println!("  INSTAGRAM_PASSWORD      Instagram password");
    println!("  INSTAGRAM_SESSION_FILE  Saved session (default: instagram_session.json)");
    println!("  INSTAGRAM_PROXY         Proxy for Instagram requests");
    println!("  HOST / PORT             Bind address (default: 0.0.0.0:8000)");
    println!("  API_KEY                 Require X-API-Key on protected endpoints");
    println!("  MIN_REQUEST_DELAY       Pacing lower bound in seconds (default: 1.0)");
    println!("  MAX_REQUEST_DELAY       Pacing upper bound in seconds (default: 3.0)");
    println!("  ENABLE_ANTI_DETECTION   Pacing and fingerprint randomization (default: true)");
}

/// Build the platform services and serve until Ctrl+C
async fn run_server(config: Config) -> anyhow::Result<()> {
    let tiktok = TikTokService::new(
        Arc::new(TikTokWebBackend::from_config(&config.tiktok)),
        config.tiktok.ms_token.clone(),
        Pacer::new("tiktok", &config.pacing),
    );

    let instagram = InstagramService::new(
        Arc::new(PrivateApiFactory::from_config(&config.instagram)),
        config.instagram.clone(),
        Pacer::new("instagram", &config.pacing),
    );

    let state = AppState {
        tiktok: Arc::new(tiktok),
        instagram: Arc::new(instagram),
        api_key: config.server.api_key.clone(),
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!("Press Ctrl+C to exit");

    sm_api::start_server(&addr, state, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C
async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

/// Resolves once `signal` fires; never resolves if the handler could not be installed
async fn wait_for_shutdown<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
