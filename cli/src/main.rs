//! Rental service CLI server
//!
//! Headless booking backend suitable for a systemd service, a container or
//! a standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/rental-service/config.toml)
//! rental-service
//!
//! # Custom config path
//! rental-service --config /etc/rental-service/config.toml
//!
//! # Override the port
//! rental-service --port 8080
//!
//! # Validate config without starting
//! rental-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use rental_service::config::AppConfig;
use rental_service::server::{init_tracing, ServerHandle, ServerOptions};

/// Rental service: properties, listings and reservations over REST.
#[derive(Parser, Debug)]
#[command(
    name = "rental-service",
    version,
    about = "Property-rental booking backend",
    long_about = "REST API server for properties, their platform listings and \
                  reservations.\n\n\
                  Default config: ~/.config/rental-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "RENTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the database URL.
    #[arg(long)]
    database_url: Option<String>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .unwrap_or_else(rental_service::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => {
            let mut cfg = AppConfig::default();
            cfg.apply_env();
            (cfg, Some(e))
        }
    };

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);

    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }
    if let Some(url) = cli.database_url {
        info!("CLI override: database url = {}", url);
        config.database.url = url;
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.server.address());
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        println!("   Log format  : {}", config.logging.format);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    handle.install_signal_handler();

    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
