//! Trading-Bot Session Telemetry Ledger
//!
//! Ingests cumulative-counter telemetry reports from trading-bot processes,
//! reconciles them into a session ledger with a single-open-session
//! guarantee, and serves reconstructed per-day delta timelines.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};

use api::{router, AppState};
use ledger_core::SessionLedger;
use sqlite_ledger::{check_connection, init_schema, LedgerConfig, SqliteLedger};
use telemetry::{health, init_tracing_from_env};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    ledger: LedgerConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ledger: LedgerConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!("Starting session ledger v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;

    // Open the session ledger and make sure the schema exists
    let ledger = Arc::new(
        SqliteLedger::connect(config.ledger.clone())
            .await
            .context("Failed to open session ledger")?,
    );

    init_schema(&ledger)
        .await
        .context("Failed to initialize ledger schema")?;

    // Check health and update status
    if check_connection(&ledger).await {
        health().ledger.set_healthy();
        info!("Session ledger: healthy");
    } else {
        health().ledger.set_unhealthy("Connection failed");
        error!("Session ledger: unhealthy");
    }

    // Create application state and router
    let state = AppState::new(ledger.clone() as Arc<dyn SessionLedger>);
    let app = router(state);

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("BOTLEDGER")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for nested ledger config from environment
    // The config crate's nested parsing doesn't work reliably with
    // underscored field names
    if let Ok(path) = std::env::var("BOTLEDGER_LEDGER_PATH") {
        config.ledger.path = path;
    }
    if let Ok(pool_size) = std::env::var("BOTLEDGER_LEDGER_POOL_SIZE") {
        config.ledger.pool_size = pool_size
            .parse()
            .context("Invalid BOTLEDGER_LEDGER_POOL_SIZE")?;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
