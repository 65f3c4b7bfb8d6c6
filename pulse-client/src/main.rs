//! Pulse client — entry point.
//!
//! A headless front end standing in for the demo's GUI: CLI flags and
//! Ctrl-C become intents on the driver's command channel, and driver
//! events are printed as they arrive.
//!
//! ```text
//! pulse-client                          Fast requests to 127.0.0.1:5000
//! pulse-client --slow --sleep-secs 5    Slow requests, 5s server sleep
//! pulse-client --save-log out.txt       Write the session log on exit
//! ```

mod config;
mod driver;

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pulse_core::RequestKind;

use config::ClientConfig;
use driver::{Driver, Event, Intent};

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "pulse-client", about = "pulse fast/slow request client")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "pulse-client.toml")]
    config: PathBuf,

    /// Server address (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config).
    #[arg(long)]
    port: Option<String>,

    /// Issue slow requests instead of fast ones.
    #[arg(long)]
    slow: bool,

    /// Server-side sleep for slow requests, in seconds.
    #[arg(long)]
    sleep_secs: Option<u64>,

    /// Pause between fast requests, in milliseconds.
    #[arg(long)]
    fast_timeout_ms: Option<u64>,

    /// Wait before reconnect attempts, in milliseconds.
    #[arg(long)]
    reconnect_timeout_ms: Option<u64>,

    /// Total connection attempts before giving up.
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Save the session log here on exit.
    #[arg(long)]
    save_log: Option<PathBuf>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&ClientConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let mut config = ClientConfig::load(&cli.config);
    if let Some(host) = cli.host.take() {
        config.server.host = host;
    }
    if let Some(port) = cli.port.take() {
        config.server.port = port;
    }
    if let Some(secs) = cli.sleep_secs {
        config.timing.sleep_secs = secs;
    }
    if let Some(ms) = cli.fast_timeout_ms {
        config.timing.fast_timeout_ms = ms;
    }
    if let Some(ms) = cli.reconnect_timeout_ms {
        config.timing.reconnect_timeout_ms = ms;
    }
    if let Some(n) = cli.max_attempts {
        config.retry.max_attempts = n;
    }

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("pulse-client v{}", env!("CARGO_PKG_VERSION"));

    let kind = if cli.slow {
        RequestKind::Slow
    } else {
        RequestKind::Fast
    };
    let session = config.session(kind);

    let (intent_tx, intent_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let driver = tokio::spawn(Driver::new(session, intent_rx, event_tx).run());

    intent_tx.send(Intent::Connect {
        host: config.server.host.clone(),
        port: config.server.port.clone(),
    })?;

    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(event) => report(event),
                None => break, // driver ended
            },
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                if let Some(path) = cli.save_log.take() {
                    let _ = intent_tx.send(Intent::SaveLog { path });
                }
                let _ = intent_tx.send(Intent::Disconnect);
                let _ = intent_tx.send(Intent::Shutdown);
            }
        }
    }

    driver.await?;
    Ok(())
}

fn report(event: Event) {
    match event {
        Event::Attempting { attempt } => info!("connection attempt {attempt}"),
        Event::Connected { endpoint } => info!(%endpoint, "connected"),
        Event::Disconnected { endpoint } => info!(%endpoint, "disconnected"),
        Event::Response { value } => info!("received: {value}"),
        Event::Error { reason } => error!("{reason}"),
        Event::LogSaved { path } => info!("session log saved to {}", path.display()),
    }
}
