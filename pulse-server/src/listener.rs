//! TCP listener: accepts connections for the process lifetime and
//! spawns one handler task per connection.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::counter::ClientCounter;
use crate::eventlog::EventLog;
use crate::handler;

pub struct Listener {
    listener: TcpListener,
    counter: ClientCounter,
    log: Arc<EventLog>,
}

impl Listener {
    /// Bind on the configured address and prepare the shared state.
    pub async fn bind(config: &ServerConfig, log: Arc<EventLog>) -> std::io::Result<Self> {
        let listener =
            TcpListener::bind((config.listen.host.as_str(), config.listen.port)).await?;
        Ok(Self {
            listener,
            counter: ClientCounter::new(),
            log,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn counter(&self) -> ClientCounter {
        self.counter.clone()
    }

    /// Accept forever. Each accepted connection raises the shared
    /// counter (until its handler exits) and gets its own task, so a
    /// handler sleeping on a slow request never stalls the accept
    /// loop.
    pub async fn run(self) -> std::io::Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let guard = self.counter.acquire();
            self.log.connected(peer);
            info!(%peer, clients = guard.count(), "connection established");

            let log = Arc::clone(&self.log);
            tokio::spawn(handler::run(stream, peer, guard, log));
        }
    }
}
