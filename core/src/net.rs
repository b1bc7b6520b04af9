/*
 * net.rs
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

//! TLS connection helpers: resolve, TCP connect, rustls client handshake.
//!
//! A session never opens sockets itself; it asks a [`Connector`] for a fresh
//! stream whenever it (re)establishes. [`TlsConnector`] is the production
//! implementation: implicit TLS on port 443 with SNI set to the host.

use std::future::Future;
use std::io;
use std::sync::{Arc, OnceLock};

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tracing::debug;

/// Port for implicit TLS.
pub const HTTPS_PORT: u16 = 443;

/// Opens the byte stream a session runs its exchanges over.
pub trait Connector: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Connect to `host` and return a stream ready for application data.
    fn connect(&self, host: &str) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Build a root certificate store: platform native certs first, then webpki-roots as fallback.
fn build_root_store() -> RootCertStore {
    let mut root_store = RootCertStore::empty();
    if let Ok(certs) = rustls_native_certs::load_native_certs() {
        for cert in certs {
            let _ = root_store.add(cert);
        }
    }
    if root_store.is_empty() {
        root_store.roots = webpki_roots::TLS_SERVER_ROOTS.to_vec();
    }
    root_store
}

/// TLS client config for HTTP/1.1 (native + Mozilla roots, no client auth, ALPN http/1.1 only).
pub fn http1_client_config() -> Arc<ClientConfig> {
    let mut config = ClientConfig::builder()
        .with_root_certificates(build_root_store())
        .with_no_client_auth();
    config.alpn_protocols = vec![b"http/1.1".to_vec()];
    Arc::new(config)
}

static DEFAULT_CONFIG: OnceLock<Arc<ClientConfig>> = OnceLock::new();

fn default_config() -> Arc<ClientConfig> {
    DEFAULT_CONFIG.get_or_init(http1_client_config).clone()
}

/// Implicit-TLS connector. Cheap to clone; the client config is shared.
#[derive(Clone)]
pub struct TlsConnector {
    inner: tokio_rustls::TlsConnector,
    port: u16,
}

impl TlsConnector {
    pub fn new(config: Arc<ClientConfig>) -> Self {
        Self {
            inner: tokio_rustls::TlsConnector::from(config),
            port: HTTPS_PORT,
        }
    }

    /// Connect to a port other than 443 (test servers, proxies).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for TlsConnector {
    fn default() -> Self {
        Self::new(default_config())
    }
}

impl std::fmt::Debug for TlsConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConnector").field("port", &self.port).finish()
    }
}

impl Connector for TlsConnector {
    type Stream = TlsStream<TcpStream>;

    async fn connect(&self, host: &str) -> io::Result<Self::Stream> {
        let server_name = ServerName::try_from(host)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid host name"))?
            .to_owned();
        let tcp = TcpStream::connect((host, self.port)).await?;
        tcp.set_nodelay(true)?;
        debug!(host, port = self.port, "TCP connected, starting TLS handshake");
        self.inner
            .connect(server_name, tcp)
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e))
    }
}
