//! Per-connection handler.
//!
//! Owns the accepted socket exclusively: a strictly sequential
//! receive / decode / respond loop, so request N is fully answered
//! before request N+1 is decoded. Slow requests sleep on the runtime
//! without blocking the listener or sibling handlers. A decode error
//! or protocol violation terminates this handler only.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use pulse_core::{Message, PulseCodec, PulseError};

use crate::counter::ClientGuard;
use crate::eventlog::EventLog;

/// Drive one connection to completion, then release its counter unit
/// and record the close.
pub async fn run<S>(stream: S, peer: SocketAddr, guard: ClientGuard, log: Arc<EventLog>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if let Err(e) = serve(stream, peer, &guard).await {
        warn!(%peer, "connection handler error: {e}");
    }
    info!(%peer, "connection closed");
    log.disconnected(peer);
    // guard drops here, decrementing the shared counter
}

async fn serve<S>(stream: S, peer: SocketAddr, guard: &ClientGuard) -> Result<(), PulseError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(stream, PulseCodec);

    // `None` is the peer closing cleanly at a frame boundary.
    while let Some(request) = framed.next().await {
        let request = request?;
        debug!(%peer, %request, "request received");

        let response = match request {
            Message::FastRequest => Message::FastResponse {
                current_time: current_time(),
            },
            Message::SlowRequest { sleep_secs } => {
                tokio::time::sleep(Duration::from_secs(sleep_secs)).await;
                Message::SlowResponse {
                    connected_clients: guard.count(),
                }
            }
            Message::FastResponse { .. } | Message::SlowResponse { .. } => {
                return Err(PulseError::ProtocolViolation(
                    "client sent a response-kind message",
                ));
            }
        };

        debug!(%peer, %response, "response sent");
        framed.send(response).await?;
    }

    Ok(())
}

fn current_time() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::ClientCounter;
    use std::time::Instant;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    /// Handler on one end of an in-memory duplex, framed client on the
    /// other.
    fn harness(
        counter: &ClientCounter,
    ) -> (
        Framed<tokio::io::DuplexStream, PulseCodec>,
        tokio::task::JoinHandle<Result<(), PulseError>>,
    ) {
        let (client_side, server_side) = tokio::io::duplex(1024);
        let guard = counter.acquire();
        let handle = tokio::spawn(async move { serve(server_side, peer(), &guard).await });
        (Framed::new(client_side, PulseCodec), handle)
    }

    #[tokio::test]
    async fn fast_request_gets_immediate_time() {
        let counter = ClientCounter::new();
        let (mut client, handle) = harness(&counter);

        client.send(Message::FastRequest).await.unwrap();
        let response = client.next().await.unwrap().unwrap();
        match response {
            Message::FastResponse { current_time } => assert!(!current_time.is_empty()),
            other => panic!("unexpected response: {other}"),
        }

        drop(client);
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn slow_request_waits_then_reports_count() {
        let counter = ClientCounter::new();
        // Two more clients connected elsewhere.
        let _extra1 = counter.acquire();
        let _extra2 = counter.acquire();
        let (mut client, _handle) = harness(&counter);

        let started = Instant::now();
        client
            .send(Message::SlowRequest { sleep_secs: 1 })
            .await
            .unwrap();
        let response = client.next().await.unwrap().unwrap();

        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(
            response,
            Message::SlowResponse {
                connected_clients: 3
            }
        );
    }

    #[tokio::test]
    async fn requests_are_answered_strictly_in_order() {
        let counter = ClientCounter::new();
        let (mut client, _handle) = harness(&counter);

        // Queue a slow request, then a fast one behind it. The fast
        // answer must not overtake the slow one.
        client
            .send(Message::SlowRequest { sleep_secs: 1 })
            .await
            .unwrap();
        client.send(Message::FastRequest).await.unwrap();

        let first = client.next().await.unwrap().unwrap();
        assert!(matches!(first, Message::SlowResponse { .. }));
        let second = client.next().await.unwrap().unwrap();
        assert!(matches!(second, Message::FastResponse { .. }));
    }

    #[tokio::test]
    async fn response_kind_from_client_is_a_violation() {
        let counter = ClientCounter::new();
        let (mut client, handle) = harness(&counter);

        client
            .send(Message::SlowResponse {
                connected_clients: 99,
            })
            .await
            .unwrap();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(PulseError::ProtocolViolation(_))));
    }

    #[tokio::test]
    async fn clean_close_is_normal_termination() {
        let counter = ClientCounter::new();
        let (client, handle) = harness(&counter);

        drop(client);
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn run_releases_the_counter_unit() {
        let counter = ClientCounter::new();
        let path =
            std::env::temp_dir().join(format!("pulse-handler-log-{}", std::process::id()));
        let log = Arc::new(EventLog::create(&path).unwrap());

        let (client_side, server_side) = tokio::io::duplex(1024);
        let guard = counter.acquire();
        assert_eq!(counter.current(), 1);

        let handle = tokio::spawn(run(server_side, peer(), guard, log));
        drop(client_side);
        handle.await.unwrap();

        assert_eq!(counter.current(), 0);
        std::fs::remove_file(&path).ok();
    }
}
