//! Managed TCP connection.
//!
//! Wraps a framed stream in background reader/writer tasks bridged by
//! mpsc channels, so callers await plain channel operations. That
//! matters on the client side: every wait (pending response, paced
//! next request, reconnect backoff) becomes a cancellable `recv`
//! inside a `select!`. Dropping the `Connection` closes both channel
//! halves, which ends the I/O tasks and the socket with them.

use std::net::{Ipv4Addr, SocketAddr};

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::debug;

use crate::codec::PulseCodec;
use crate::error::PulseError;
use crate::message::Message;

/// Sender half handed out to tasks that only write.
pub type ConnectionSender = mpsc::Sender<Message>;

/// A pulse connection to a single peer.
#[derive(Debug)]
pub struct Connection {
    // Channel to the background writer task
    tx: mpsc::Sender<Message>,
    // Channel from the background reader task
    rx: mpsc::Receiver<Message>,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Self {
        let (mut net_writer, mut net_reader) = Framed::new(stream, PulseCodec).split();

        // User -> Network
        let (user_tx, mut network_rx) = mpsc::channel(100);

        // Network -> User
        let (network_tx, user_rx) = mpsc::channel(100);

        // Writer task: User -> Network
        tokio::spawn(async move {
            while let Some(message) = network_rx.recv().await {
                if let Err(e) = net_writer.send(message).await {
                    debug!("network write error: {e}");
                    break;
                }
            }
        });

        // Reader task: Network -> User
        tokio::spawn(async move {
            while let Some(result) = net_reader.next().await {
                match result {
                    Ok(message) => {
                        if network_tx.send(message).await.is_err() {
                            // user_rx was dropped, stop reading
                            break;
                        }
                    }
                    Err(e) => {
                        debug!("network read error: {e}");
                        break; // Stop on codec/network errors
                    }
                }
            }
        });

        Self {
            tx: user_tx,
            rx: user_rx,
        }
    }

    /// Connect to `endpoint` and wrap the stream.
    pub async fn connect(endpoint: &Endpoint) -> Result<Self, std::io::Error> {
        let stream = TcpStream::connect(endpoint.socket_addr()).await?;
        Ok(Self::new(stream))
    }

    /// Queue a message for the background writer.
    pub async fn send(&self, message: Message) -> Result<(), PulseError> {
        self.tx.send(message).await?;
        Ok(())
    }

    /// Receive the next inbound message. `None` means the peer closed
    /// the stream (or the reader task hit a decode error and bailed).
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    pub fn sender(&self) -> ConnectionSender {
        self.tx.clone()
    }
}

// ── Endpoint ─────────────────────────────────────────────────────

/// A validated IPv4 host + port pair.
///
/// Built through [`Endpoint::parse`] from operator-supplied strings,
/// so by the time a connection is attempted both fields are known
/// good — malformed input is rejected before any socket operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    host: Ipv4Addr,
    port: u16,
}

impl Endpoint {
    pub fn new(host: Ipv4Addr, port: u16) -> Self {
        Self { host, port }
    }

    /// Validate operator-supplied host and port strings.
    ///
    /// Rejects anything that is not a full dotted-quad IPv4 address
    /// (`"1.2.3"` and `"1.2.3."` both fail) and any port that is not
    /// a number in `1..=65535`.
    pub fn parse(host: &str, port: &str) -> Result<Self, PulseError> {
        let host: Ipv4Addr = host
            .parse()
            .map_err(|_| PulseError::InvalidAddress(host.to_string()))?;
        let port: u16 = port
            .parse()
            .map_err(|_| PulseError::InvalidPort(port.to_string()))?;
        if port == 0 {
            return Err(PulseError::InvalidPort(port.to_string()));
        }
        Ok(Self { host, port })
    }

    pub fn host(&self) -> Ipv4Addr {
        self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
