//! Client driver: the connection state machine and request cycle.
//!
//! The front end posts typed [`Intent`]s on a command channel and the
//! driver posts typed [`Event`]s back — no protocol logic leaks into
//! the presentation layer. All suspension points (pending response,
//! fast-mode pacing, reconnect wait) sit inside `select!` with the
//! intent channel, so a `Disconnect` cancels them cleanly.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use pulse_core::{ClientSession, Connection, Endpoint, Message, RequestKind};

// ── Intents and events ───────────────────────────────────────────

/// A user intent, as the excluded GUI would express it.
#[derive(Debug)]
pub enum Intent {
    Connect { host: String, port: String },
    Disconnect,
    SetRequestKind(RequestKind),
    SetSlowSleepSecs(u64),
    SetFastTimeoutMs(u64),
    SetReconnectTimeoutMs(u64),
    SaveLog { path: PathBuf },
    Shutdown,
}

/// A status observation for the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A connection attempt is starting (1-based).
    Attempting { attempt: u32 },
    Connected { endpoint: Endpoint },
    Disconnected { endpoint: Endpoint },
    /// The payload value of a received response, as display text.
    Response { value: String },
    Error { reason: String },
    LogSaved { path: PathBuf },
}

/// What to do after an intent arrives while a wait is pending.
enum WaitControl {
    Continue,
    Cancel,
}

// ── Driver ───────────────────────────────────────────────────────

pub struct Driver {
    session: ClientSession,
    intents: mpsc::UnboundedReceiver<Intent>,
    events: mpsc::UnboundedSender<Event>,
    /// Timestamped session log, mirroring the GUI's text pane.
    log: Vec<String>,
    shutdown: bool,
}

impl Driver {
    pub fn new(
        session: ClientSession,
        intents: mpsc::UnboundedReceiver<Intent>,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            session,
            intents,
            events,
            log: Vec::new(),
            shutdown: false,
        }
    }

    /// Process intents until shutdown. Between sessions the driver is
    /// idle here; `Connect` hands control to [`Self::connect_session`]
    /// until the session ends one way or another.
    pub async fn run(mut self) {
        while !self.shutdown {
            let Some(intent) = self.intents.recv().await else {
                break;
            };
            match intent {
                Intent::Connect { host, port } => match Endpoint::parse(&host, &port) {
                    Ok(endpoint) => self.connect_session(endpoint).await,
                    Err(e) => self.error(e.to_string()),
                },
                Intent::Disconnect => {} // already idle
                Intent::Shutdown => break,
                other => self.apply(other),
            }
        }
    }

    // ── Connection state machine ─────────────────────────────────

    /// Idle → Connecting → Connected → … → Idle, with bounded
    /// auto-retry on transient connect failures.
    async fn connect_session(&mut self, endpoint: Endpoint) {
        if let Err(e) = self.session.phase_mut().begin_connect() {
            self.error(e.to_string());
            return;
        }

        loop {
            let attempt = self.session.begin_attempt();
            self.push(format!("Connection attempt {attempt}..."));
            let _ = self.events.send(Event::Attempting { attempt });

            match Connection::connect(&endpoint).await {
                Ok(conn) => {
                    self.session.reset_attempts();
                    let _ = self.session.phase_mut().complete_connect();
                    self.push(format!("Connected to {endpoint}"));
                    let _ = self.events.send(Event::Connected { endpoint });

                    self.request_cycle(conn).await;

                    let _ = self.session.phase_mut().begin_disconnect();
                    let _ = self.session.phase_mut().finish_disconnect();
                    self.push(format!("Disconnected from {endpoint}"));
                    let _ = self.events.send(Event::Disconnected { endpoint });
                    return;
                }
                Err(e) if self.session.should_retry(&e) => {
                    debug!("transient connect failure: {e}");
                    // The failed connection is dropped (fully closed)
                    // before the reconnect wait starts.
                    let wait = self.session.reconnect_timeout();
                    if !self.pause(wait).await {
                        self.session.reset_attempts();
                        self.session.phase_mut().force_idle();
                        return;
                    }
                }
                Err(e) => {
                    self.error(format!("connection failed: {e}"));
                    self.session.reset_attempts();
                    self.session.phase_mut().force_idle();
                    return;
                }
            }
        }
    }

    // ── Request/response cycle ───────────────────────────────────

    /// One request in flight at a time, for as long as the session
    /// stays connected. Fast mode paces itself with the configured
    /// timeout; slow mode is paced by the server-side sleep.
    async fn request_cycle(&mut self, mut conn: Connection) {
        loop {
            let request = self.session.next_request();
            let fast = self.session.request_kind() == RequestKind::Fast;
            if conn.send(request).await.is_err() {
                return; // writer gone: connection closed under us
            }
            self.push("Request sent".to_string());

            // Await the paired response; intents stay live meanwhile.
            let response = loop {
                tokio::select! {
                    received = conn.recv() => match received {
                        Some(
                            message @ (Message::FastResponse { .. }
                            | Message::SlowResponse { .. }),
                        ) => break message,
                        Some(other) => {
                            self.error(format!("unexpected message from server: {other}"));
                            return;
                        }
                        // Peer closed, or a decode error ended the reader.
                        None => return,
                    },
                    intent = self.intents.recv() => {
                        if let WaitControl::Cancel = self.mid_session(intent) {
                            return;
                        }
                    }
                }
            };

            let value = match response {
                Message::FastResponse { current_time } => current_time,
                Message::SlowResponse { connected_clients } => connected_clients.to_string(),
                _ => unreachable!("filtered above"),
            };
            self.push(format!("Received message: {value}"));
            let _ = self.events.send(Event::Response { value });

            if fast {
                let wait = self.session.fast_timeout();
                if !self.pause(wait).await {
                    return;
                }
            }
        }
    }

    // ── Waits and intent plumbing ────────────────────────────────

    /// Sleep for `duration` while staying responsive to intents.
    /// Returns `false` when the wait was cancelled by a disconnect or
    /// shutdown.
    async fn pause(&mut self, duration: Duration) -> bool {
        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                intent = self.intents.recv() => {
                    if let WaitControl::Cancel = self.mid_session(intent) {
                        return false;
                    }
                }
            }
        }
    }

    fn mid_session(&mut self, intent: Option<Intent>) -> WaitControl {
        match intent {
            None => {
                // Front end dropped its sender; treat as shutdown.
                self.shutdown = true;
                WaitControl::Cancel
            }
            Some(Intent::Disconnect) => WaitControl::Cancel,
            Some(Intent::Shutdown) => {
                self.shutdown = true;
                WaitControl::Cancel
            }
            Some(other) => {
                self.apply(other);
                WaitControl::Continue
            }
        }
    }

    /// Settings and log intents, valid in any state.
    fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::SetRequestKind(kind) => self.session.set_request_kind(kind),
            Intent::SetSlowSleepSecs(secs) => self.session.set_sleep_secs(secs),
            Intent::SetFastTimeoutMs(ms) => {
                self.session.set_fast_timeout(Duration::from_millis(ms));
            }
            Intent::SetReconnectTimeoutMs(ms) => {
                self.session.set_reconnect_timeout(Duration::from_millis(ms));
            }
            Intent::SaveLog { path } => self.save_log(path),
            Intent::Connect { .. } => {
                self.error("connect ignored: a session is already active".to_string());
            }
            Intent::Disconnect | Intent::Shutdown => {}
        }
    }

    // ── Session log ──────────────────────────────────────────────

    fn push(&mut self, line: String) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        self.log.push(format!("{timestamp} {line}"));
    }

    fn error(&mut self, reason: String) {
        warn!("{reason}");
        self.push(format!("ERROR {reason}"));
        let _ = self.events.send(Event::Error { reason });
    }

    fn save_log(&mut self, path: PathBuf) {
        match std::fs::write(&path, self.log.join("\n") + "\n") {
            Ok(()) => {
                let _ = self.events.send(Event::LogSaved { path });
            }
            Err(e) => self.error(format!("failed to save log: {e}")),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
