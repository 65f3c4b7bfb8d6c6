//! Integration tests — message round-trips and connection lifecycle
//! over a real TCP connection on localhost.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use pulse_core::{Connection, Endpoint, Message, PulseCodec};
use tokio::net::TcpListener;
use tokio_util::codec::Framed;

// ── Helpers ──────────────────────────────────────────────────────

/// Spin up a listener on an OS-assigned port and return its endpoint.
/// The listener is returned so the caller can accept on it.
async fn ephemeral_listener() -> (TcpListener, Endpoint) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let endpoint = Endpoint::parse(&addr.ip().to_string(), &addr.port().to_string()).unwrap();
    (listener, endpoint)
}

async fn recv_timeout(conn: &mut Connection) -> Message {
    tokio::time::timeout(Duration::from_secs(5), conn.recv())
        .await
        .expect("timeout")
        .expect("recv returned None")
}

// ── Connection lifecycle ─────────────────────────────────────────

#[tokio::test]
async fn request_response_over_tcp() {
    let (listener, endpoint) = ephemeral_listener().await;

    let client_handle = tokio::spawn(async move { Connection::connect(&endpoint).await.unwrap() });

    let (stream, _) = listener.accept().await.unwrap();
    let mut server_conn = Connection::new(stream);
    let mut client_conn = client_handle.await.unwrap();

    // Client sends a fast request
    client_conn.send(Message::FastRequest).await.unwrap();
    let request = recv_timeout(&mut server_conn).await;
    assert_eq!(request, Message::FastRequest);

    // Server answers
    server_conn
        .send(Message::FastResponse {
            current_time: "2024-06-01 10:00:00".into(),
        })
        .await
        .unwrap();
    let response = recv_timeout(&mut client_conn).await;
    assert!(matches!(response, Message::FastResponse { .. }));
}

#[tokio::test]
async fn requests_arrive_in_order() {
    let (listener, endpoint) = ephemeral_listener().await;

    let client_handle = tokio::spawn(async move { Connection::connect(&endpoint).await.unwrap() });

    let (stream, _) = listener.accept().await.unwrap();
    let mut server_conn = Connection::new(stream);
    let client_conn = client_handle.await.unwrap();

    for secs in 1u64..=5 {
        client_conn
            .send(Message::SlowRequest { sleep_secs: secs })
            .await
            .unwrap();
    }

    for secs in 1u64..=5 {
        assert_eq!(
            recv_timeout(&mut server_conn).await,
            Message::SlowRequest { sleep_secs: secs }
        );
    }
}

#[tokio::test]
async fn peer_close_ends_recv_with_none() {
    let (listener, endpoint) = ephemeral_listener().await;

    let client_handle = tokio::spawn(async move { Connection::connect(&endpoint).await.unwrap() });

    let (stream, _) = listener.accept().await.unwrap();
    let server_conn = Connection::new(stream);
    let mut client_conn = client_handle.await.unwrap();

    drop(server_conn);

    let got = tokio::time::timeout(Duration::from_secs(5), client_conn.recv())
        .await
        .expect("timeout");
    assert!(got.is_none());
}

#[tokio::test]
async fn connect_to_closed_port_is_refused() {
    // Bind, learn the port, drop the listener — nothing is listening.
    let (listener, endpoint) = ephemeral_listener().await;
    drop(listener);

    let err = Connection::connect(&endpoint).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::ConnectionRefused);
}

// ── Codec over a real socket ─────────────────────────────────────

#[tokio::test]
async fn framed_stream_reassembles_partial_writes() {
    use tokio::io::AsyncWriteExt;

    let (listener, endpoint) = ephemeral_listener().await;

    let writer_handle = tokio::spawn(async move {
        let mut stream = tokio::net::TcpStream::connect(endpoint.socket_addr())
            .await
            .unwrap();

        let mut buf = bytes::BytesMut::new();
        tokio_util::codec::Encoder::encode(
            &mut PulseCodec,
            Message::SlowResponse {
                connected_clients: 42,
            },
            &mut buf,
        )
        .unwrap();

        // Dribble the frame out one byte at a time.
        for byte in buf.iter() {
            stream.write_all(&[*byte]).await.unwrap();
            stream.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    });

    let (stream, _) = listener.accept().await.unwrap();
    let mut framed = Framed::new(stream, PulseCodec);

    let decoded = tokio::time::timeout(Duration::from_secs(5), framed.next())
        .await
        .expect("timeout")
        .expect("stream ended")
        .expect("decode error");
    assert_eq!(
        decoded,
        Message::SlowResponse {
            connected_clients: 42
        }
    );

    writer_handle.await.unwrap();
}

#[tokio::test]
async fn mid_frame_close_surfaces_decode_error() {
    use tokio::io::AsyncWriteExt;

    let (listener, endpoint) = ephemeral_listener().await;

    tokio::spawn(async move {
        let mut stream = tokio::net::TcpStream::connect(endpoint.socket_addr())
            .await
            .unwrap();
        // Length prefix promising 16 bytes, then close.
        stream.write_all(&16u32.to_be_bytes()).await.unwrap();
        stream.flush().await.unwrap();
    });

    let (stream, _) = listener.accept().await.unwrap();
    let mut framed = Framed::new(stream, PulseCodec);

    let got = tokio::time::timeout(Duration::from_secs(5), framed.next())
        .await
        .expect("timeout")
        .expect("stream ended");
    assert!(got.is_err());
}

#[tokio::test]
async fn clean_close_at_frame_boundary_is_not_an_error() {
    let (listener, endpoint) = ephemeral_listener().await;

    tokio::spawn(async move {
        let mut framed = Framed::new(
            tokio::net::TcpStream::connect(endpoint.socket_addr())
                .await
                .unwrap(),
            PulseCodec,
        );
        framed.send(Message::FastRequest).await.unwrap();
        // Dropping the framed stream closes the socket at the boundary.
    });

    let (stream, _) = listener.accept().await.unwrap();
    let mut framed = Framed::new(stream, PulseCodec);

    let first = tokio::time::timeout(Duration::from_secs(5), framed.next())
        .await
        .expect("timeout")
        .expect("stream ended")
        .expect("decode error");
    assert_eq!(first, Message::FastRequest);

    let second = tokio::time::timeout(Duration::from_secs(5), framed.next())
        .await
        .expect("timeout");
    assert!(second.is_none());
}
