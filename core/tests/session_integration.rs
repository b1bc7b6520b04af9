/*
 * session_integration.rs
 * Copyright (C) 2026 the Livekeeper authors
 *
 * This file is part of Livekeeper, a live-room companion for fan medals.
 *
 * Livekeeper is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Livekeeper is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Livekeeper.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Session against a local server that writes its responses in delayed
//! fragments, over plain TCP through the public `Connector` trait and over
//! TLS through `TlsConnector`.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ClientConfig, RootCertStore, ServerConfig};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;

use livekeeper_core::protocol::https::{HttpsError, Request, Session};
use livekeeper_core::scan::scan_uint;
use livekeeper_core::{Connector, TlsConnector};

/// Test CA, and a `localhost` certificate it signed (P-256, PKCS#8 key).
const CA_CERT: &[u8] = include_bytes!("data/ca.der");
const LOCALHOST_CERT: &[u8] = include_bytes!("data/localhost.der");
const LOCALHOST_KEY: &[u8] = include_bytes!("data/localhost.key.der");

/// Connects to the fake server whatever the host.
struct PlainConnector {
    port: u16,
}

impl Connector for PlainConnector {
    type Stream = TcpStream;

    async fn connect(&self, _host: &str) -> io::Result<TcpStream> {
        TcpStream::connect(("127.0.0.1", self.port)).await
    }
}

/// Maps a request line to the response fragments to send back.
type Responder = fn(&str) -> Vec<Vec<u8>>;

/// What the server does with a connection once it has answered a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterResponse {
    KeepAlive,
    /// Drop the socket without any goodbye (no TLS close_notify either).
    Close,
}

struct FakeServer {
    port: u16,
    accepted: Arc<AtomicUsize>,
}

impl FakeServer {
    async fn start(respond: Responder) -> Self {
        Self::spawn(respond, AfterResponse::KeepAlive, None).await
    }

    async fn start_closing(respond: Responder) -> Self {
        Self::spawn(respond, AfterResponse::Close, None).await
    }

    async fn start_tls_closing(respond: Responder) -> Self {
        Self::spawn(respond, AfterResponse::Close, Some(tls_acceptor())).await
    }

    async fn spawn(respond: Responder, after: AfterResponse, tls: Option<TlsAcceptor>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accepted = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&accepted);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                count.fetch_add(1, Ordering::SeqCst);
                match tls.clone() {
                    None => {
                        tokio::spawn(serve(stream, respond, after));
                    }
                    Some(acceptor) => {
                        tokio::spawn(async move {
                            if let Ok(stream) = acceptor.accept(stream).await {
                                serve(stream, respond, after).await;
                            }
                        });
                    }
                }
            }
        });
        Self { port, accepted }
    }

    async fn session(&self) -> Session<PlainConnector> {
        Session::establish_with(PlainConnector { port: self.port }, "fake.test", "SESSDATA=x")
            .await
            .unwrap()
    }

    async fn tls_session(&self) -> Session<TlsConnector> {
        let connector = TlsConnector::new(tls_client_config()).with_port(self.port);
        Session::establish_with(connector, "localhost", "SESSDATA=x")
            .await
            .unwrap()
    }

    fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

fn tls_acceptor() -> TlsAcceptor {
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(LOCALHOST_KEY.to_vec()));
    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![CertificateDer::from(LOCALHOST_CERT.to_vec())], key)
        .unwrap();
    TlsAcceptor::from(Arc::new(config))
}

fn tls_client_config() -> Arc<ClientConfig> {
    let mut roots = RootCertStore::empty();
    roots.add(CertificateDer::from(CA_CERT.to_vec())).unwrap();
    let mut config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    config.alpn_protocols = vec![b"http/1.1".to_vec()];
    Arc::new(config)
}

async fn serve<S>(mut stream: S, respond: Responder, after: AfterResponse)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    loop {
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            match stream.read(&mut tmp).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&tmp[..n]),
            }
            continue;
        };
        let head: Vec<u8> = buf.drain(..end + 4).collect();
        let head = String::from_utf8_lossy(&head).into_owned();
        let request_line = head.lines().next().unwrap_or_default().to_string();
        for fragment in respond(&request_line) {
            if stream.write_all(&fragment).await.is_err() {
                return;
            }
            stream.flush().await.ok();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        if after == AfterResponse::Close {
            return;
        }
    }
}

fn split(wire: &[u8], sizes: &[usize]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut rest = wire;
    for &size in sizes {
        let (head, tail) = rest.split_at(size.min(rest.len()));
        out.push(head.to_vec());
        rest = tail;
    }
    if !rest.is_empty() {
        out.push(rest.to_vec());
    }
    out
}

#[tokio::test]
async fn content_length_body_across_delayed_fragments() {
    let server = FakeServer::start(|_| {
        let body = "{\"code\":0,\"data\":{\"timestamp\":1700000000}}";
        let wire = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{}", body.len(), body);
        split(wire.as_bytes(), &[3, 20, 1, 30])
    })
    .await;
    let session = server.session().await;

    let body = session
        .exchange(&Request::get("/xlive/open-interface/v1/rtc/getTimestamp"))
        .await
        .unwrap();
    assert_eq!(body, "{\"code\":0,\"data\":{\"timestamp\":1700000000}}");
    assert_eq!(scan_uint(&body, "\"timestamp\":", 0).map(|(v, _)| v), Some(1_700_000_000));
}

#[tokio::test]
async fn chunked_body_across_delayed_fragments() {
    let server = FakeServer::start(|_| {
        let wire = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\nc\r\n, big world!\r\n0\r\n\r\n";
        split(wire, &[10, 40, 2, 6, 9, 1])
    })
    .await;
    let session = server.session().await;

    let body = session.exchange(&Request::get("/")).await.unwrap();
    assert_eq!(body, "hello, big world!");
}

#[tokio::test]
async fn keep_alive_reuses_one_connection() {
    let server = FakeServer::start(|_| vec![b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok".to_vec()]).await;
    let session = server.session().await;
    for _ in 0..3 {
        assert_eq!(session.exchange(&Request::get("/")).await.unwrap(), "ok");
    }
    assert_eq!(server.accepted(), 1);
}

#[tokio::test]
async fn error_status_then_fresh_connection() {
    let server = FakeServer::start(|line| {
        if line.starts_with("GET /missing ") {
            vec![b"HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\n\r\nnot found".to_vec()]
        } else {
            vec![b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok".to_vec()]
        }
    })
    .await;
    let session = server.session().await;

    let err = session.exchange(&Request::get("/missing")).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(matches!(err, HttpsError::HttpStatus { code: 404 }));

    assert_eq!(session.exchange(&Request::get("/")).await.unwrap(), "ok");
    assert_eq!(server.accepted(), 2);
}

#[tokio::test]
async fn concurrent_callers_each_get_their_own_response() {
    let server = FakeServer::start(|line| {
        // Echo the path back, split so responses could interleave if exchanges overlapped.
        let path = line.split(' ').nth(1).unwrap_or_default().to_string();
        let wire = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{}", path.len(), path);
        split(wire.as_bytes(), &[7, 25])
    })
    .await;
    let session = Arc::new(server.session().await);

    let mut tasks = Vec::new();
    for room in 0..8u64 {
        let session = Arc::clone(&session);
        tasks.push(tokio::spawn(async move {
            let path = format!("/room/{}", room);
            let body = session.exchange(&Request::get(path.clone())).await.unwrap();
            (path, body)
        }));
    }
    for task in tasks {
        let (path, body) = task.await.unwrap();
        assert_eq!(path, body);
    }
    assert_eq!(server.accepted(), 1);
}

#[tokio::test]
async fn unreachable_server_is_a_connect_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = Session::establish_with(PlainConnector { port }, "fake.test", "c")
        .await
        .unwrap_err();
    assert!(matches!(err, HttpsError::Connect { .. }));
}

fn ok(_: &str) -> Vec<Vec<u8>> {
    vec![b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok".to_vec()]
}

#[tokio::test]
async fn server_closing_idle_connection_is_recovered_transparently() {
    let server = FakeServer::start_closing(ok).await;
    let session = server.session().await;

    assert_eq!(session.exchange(&Request::get("/")).await.unwrap(), "ok");
    // Let the close reach the client before the next request goes out.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.exchange(&Request::get("/")).await.unwrap(), "ok");
    assert_eq!(server.accepted(), 2);
}

#[tokio::test]
async fn tls_close_without_close_notify_is_recovered_transparently() {
    let server = FakeServer::start_tls_closing(ok).await;
    let session = server.tls_session().await;

    assert_eq!(session.exchange(&Request::get("/")).await.unwrap(), "ok");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.exchange(&Request::get("/")).await.unwrap(), "ok");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.exchange(&Request::get("/")).await.unwrap(), "ok");
    assert_eq!(server.accepted(), 3);
}
