/*
 * session.rs
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

//! HTTPS session: one long-lived connection to a fixed host, one exchange at a time.
//!
//! The connection sits behind an async mutex that [`Session::exchange`]
//! holds from the first byte written to the last byte read, so concurrent
//! callers queue and never see each other's bytes. The raw stream is never
//! handed out.
//!
//! Servers close idle keep-alive connections without telling us; we only
//! notice when the next request is written (zero bytes accepted, or a
//! reset) or when its response never starts (zero bytes read, or a TLS
//! stream ending without close_notify). Either case, before any byte of the
//! exchange went through, reconnects in place and sends the request again,
//! at most once per exchange. The same signal later in the exchange means
//! it was cut in the middle and is fatal.

use bytes::Bytes;
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::net::{Connector, TlsConnector};
use crate::protocol::https::error::{ExchangePhase, HttpsError, HttpsResult};
use crate::protocol::https::h1::{
    find_head_end, read_chunked_body, read_sized_body, BodyFraming, RecvBuffer, ResponseHead,
    HEAD_TERMINATOR,
};
use crate::protocol::https::request::Request;

/// The response head must end within this many bytes.
pub const HEAD_WINDOW: usize = 8192;

/// Connection state. `Down` only between tearing a stream down and opening
/// its replacement, or after a failed exchange dropped a stream.
enum Link<S> {
    Connected(S),
    Down,
}

impl<S> Link<S> {
    fn stream(&mut self) -> io::Result<&mut S> {
        match self {
            Link::Connected(s) => Ok(s),
            Link::Down => Err(io::Error::new(io::ErrorKind::NotConnected, "no connection")),
        }
    }
}

/// Result of writing a whole request.
enum Sent {
    Done,
    /// The very first write failed to go out: the peer closed the idle connection.
    IdleClosed,
}

/// Session over implicit TLS; the usual way to talk to a site.
pub type HttpsClient = Session<TlsConnector>;

/// One connection to `host`, carrying `credential` as the Cookie of every request.
pub struct Session<C: Connector = TlsConnector> {
    host: String,
    credential: String,
    connector: C,
    link: Mutex<Link<C::Stream>>,
}

impl Session<TlsConnector> {
    /// Connect to `host` on port 443 and complete the TLS handshake.
    pub async fn establish(
        host: impl Into<String>,
        credential: impl Into<String>,
    ) -> HttpsResult<Self> {
        Self::establish_with(TlsConnector::default(), host, credential).await
    }
}

impl<C: Connector> Session<C> {
    /// Connect through `connector`. Fails with `Connect` if the first connection cannot be made.
    pub async fn establish_with(
        connector: C,
        host: impl Into<String>,
        credential: impl Into<String>,
    ) -> HttpsResult<Self> {
        let host = host.into();
        let stream = open(&connector, &host).await?;
        Ok(Self {
            host,
            credential: credential.into(),
            connector,
            link: Mutex::new(Link::Connected(stream)),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Send `request` and return the decoded body as text (invalid UTF-8 is replaced).
    pub async fn exchange(&self, request: &Request) -> HttpsResult<String> {
        let body = self.exchange_bytes(request).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Send `request` and return the decoded body.
    ///
    /// Fails on any non-2xx status, malformed framing or I/O failure. A
    /// failed exchange drops the connection; the next one starts on a new
    /// connection.
    pub async fn exchange_bytes(&self, request: &Request) -> HttpsResult<Bytes> {
        let wire = request.to_wire(&self.host, &self.credential);
        let mut link = self.link.lock().await;
        debug!(host = %self.host, method = request.method.as_str(), path = %request.path, "exchange");
        match self.run_exchange(&mut link, &wire).await {
            Ok(body) => {
                debug!(host = %self.host, bytes = body.len(), "exchange complete");
                Ok(body)
            }
            Err(e) => {
                debug!(host = %self.host, error = %e, "exchange failed, dropping connection");
                *link = Link::Down;
                Err(e)
            }
        }
    }

    /// Close the TLS session and the socket.
    pub async fn close(self) -> HttpsResult<()> {
        if let Link::Connected(mut stream) = self.link.into_inner() {
            stream.shutdown().await.map_err(HttpsError::Write)?;
        }
        Ok(())
    }

    async fn run_exchange(&self, link: &mut Link<C::Stream>, wire: &[u8]) -> HttpsResult<Bytes> {
        if let Link::Down = link {
            info!(host = %self.host, "no connection, connecting");
            *link = Link::Connected(open(&self.connector, &self.host).await?);
        }
        let mut reconnected = false;

        self.send_request(link, wire, &mut reconnected).await?;

        let mut recv = RecvBuffer::new();
        let head_end = self
            .read_head(link, wire, &mut recv, &mut reconnected)
            .await?;
        let head = ResponseHead::parse(&recv.as_slice()[..head_end])?;
        recv.advance(head_end + HEAD_TERMINATOR.len())?;

        let stream = link.stream().map_err(HttpsError::Read)?;
        let body = match head.framing {
            BodyFraming::Empty => Bytes::new(),
            BodyFraming::Length(len) => read_sized_body(stream, &mut recv, len).await?,
            BodyFraming::Chunked => read_chunked_body(stream, &mut recv).await?,
        };
        if !recv.is_empty() {
            warn!(host = %self.host, bytes = recv.len(), "discarding bytes received past the end of the response");
        }
        Ok(body)
    }

    /// Write the request, reconnecting once if the idle connection was closed under us.
    async fn send_request(
        &self,
        link: &mut Link<C::Stream>,
        wire: &[u8],
        reconnected: &mut bool,
    ) -> HttpsResult<()> {
        loop {
            let stream = link.stream().map_err(HttpsError::Write)?;
            match write_all(stream, wire).await? {
                Sent::Done => return Ok(()),
                Sent::IdleClosed if *reconnected => {
                    return Err(HttpsError::ConnectionReset {
                        phase: ExchangePhase::Write,
                    })
                }
                Sent::IdleClosed => {
                    info!(host = %self.host, "peer closed idle connection, reconnecting before write");
                    *reconnected = true;
                    self.reestablish(link).await?;
                }
            }
        }
    }

    /// Read until the head terminator, returning its offset in `recv`.
    async fn read_head(
        &self,
        link: &mut Link<C::Stream>,
        wire: &[u8],
        recv: &mut RecvBuffer,
        reconnected: &mut bool,
    ) -> HttpsResult<usize> {
        let mut scanned = 0;
        loop {
            if recv.len() >= HEAD_WINDOW {
                return Err(HttpsError::framing(format!(
                    "no end of response head within {} bytes",
                    HEAD_WINDOW
                )));
            }
            let limit = HEAD_WINDOW - recv.len();
            let stream = link.stream().map_err(HttpsError::Read)?;
            let n = match recv.read_some(stream, limit).await {
                Ok(n) => n,
                Err(e) if is_peer_close(&e) => {
                    debug!(host = %self.host, error = %e, "connection closed by peer");
                    0
                }
                Err(e) => return Err(HttpsError::Read(e)),
            };
            if n == 0 {
                if !recv.is_empty() || *reconnected {
                    return Err(HttpsError::ConnectionReset {
                        phase: ExchangePhase::Read,
                    });
                }
                info!(host = %self.host, "peer closed idle connection before responding, reconnecting and resending");
                *reconnected = true;
                self.reestablish(link).await?;
                let stream = link.stream().map_err(HttpsError::Write)?;
                if let Sent::IdleClosed = write_all(stream, wire).await? {
                    return Err(HttpsError::ConnectionReset {
                        phase: ExchangePhase::Write,
                    });
                }
                continue;
            }
            if let Some(end) = find_head_end(recv.as_slice(), scanned) {
                return Ok(end);
            }
            scanned = recv.len().saturating_sub(HEAD_TERMINATOR.len() - 1);
        }
    }

    /// Connected -> Down -> Connected, in place, with the session lock held.
    async fn reestablish(&self, link: &mut Link<C::Stream>) -> HttpsResult<()> {
        if let Link::Connected(mut old) = std::mem::replace(link, Link::Down) {
            let _ = old.shutdown().await;
        }
        *link = Link::Connected(open(&self.connector, &self.host).await?);
        Ok(())
    }
}

impl<C: Connector> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("host", &self.host).finish()
    }
}

async fn open<C: Connector>(connector: &C, host: &str) -> HttpsResult<C::Stream> {
    let stream = connector
        .connect(host)
        .await
        .map_err(|e| HttpsError::connect(host, e))?;
    debug!(host, "connection established");
    Ok(stream)
}

/// Errors a stream reports when the peer has gone away rather than a local failure.
///
/// rustls reports a TCP close without close_notify as `UnexpectedEof`, and a
/// write into a socket the peer already closed can fail with a reset or a
/// broken pipe instead of accepting zero bytes.
fn is_peer_close(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}

/// Write all of `buf`, looping over partial writes.
async fn write_all<S>(stream: &mut S, buf: &[u8]) -> HttpsResult<Sent>
where
    S: AsyncWrite + Unpin,
{
    let mut sent = 0;
    while sent < buf.len() {
        match stream.write(&buf[sent..]).await {
            Ok(0) if sent == 0 => return Ok(Sent::IdleClosed),
            Ok(0) => {
                return Err(HttpsError::ConnectionReset {
                    phase: ExchangePhase::Write,
                })
            }
            Ok(n) => sent += n,
            Err(e) if sent == 0 && is_peer_close(&e) => return Ok(Sent::IdleClosed),
            Err(e) => return Err(HttpsError::Write(e)),
        }
    }
    stream.flush().await.map_err(HttpsError::Write)?;
    Ok(Sent::Done)
}
