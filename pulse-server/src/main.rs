//! Pulse server — entry point.
//!
//! ```text
//! pulse-server                    Listen with defaults (127.0.0.1:5000)
//! pulse-server --config <path>    Use custom config TOML
//! pulse-server --gen-config       Dump default config and exit
//! ```

mod config;
mod counter;
mod eventlog;
mod handler;
mod listener;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::ServerConfig;
use eventlog::EventLog;
use listener::Listener;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "pulse-server", about = "pulse fast/slow request server")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "pulse-server.toml")]
    config: PathBuf,

    /// Listen address (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides config).
    #[arg(long)]
    port: Option<u16>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&ServerConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let mut config = ServerConfig::load(&cli.config);
    if let Some(host) = cli.host {
        config.listen.host = host;
    }
    if let Some(port) = cli.port {
        config.listen.port = port;
    }

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("pulse-server v{}", env!("CARGO_PKG_VERSION"));

    let log = Arc::new(EventLog::create(&config.logging.event_log)?);
    let listener = Listener::bind(&config, log).await?;
    info!(addr = %listener.local_addr()?, "listening");

    listener.run().await?;
    Ok(())
}
