//! Append-only connection event log.
//!
//! One timestamped text record per connection established / closed,
//! with the peer address — the demo's `log.log`. The file is
//! truncated at server start and appended to for the process
//! lifetime. Log-write failures are reported but never terminate a
//! handler.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use tracing::warn;

#[derive(Debug)]
pub struct EventLog {
    file: Mutex<File>,
}

impl EventLog {
    /// Create (truncating any previous run's records) the log file.
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    pub fn connected(&self, peer: SocketAddr) {
        self.append(&format!("Connection from {peer}"));
    }

    pub fn disconnected(&self, peer: SocketAddr) {
        self.append(&format!("Close connection from {peer}"));
    }

    fn append(&self, event: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.6f");
        let mut file = self.file.lock().expect("event log mutex poisoned");
        if let Err(e) = writeln!(file, "{timestamp} {event}") {
            warn!("event log write failed: {e}");
        }
    }
}
