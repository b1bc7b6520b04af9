/*
 * error.rs
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

//! Errors raised by the HTTPS session and the HTTP/1.1 framer.
//!
//! Every variant is fatal for the exchange that produced it. The only
//! condition the session recovers from on its own (an idle connection the
//! peer closed) never surfaces here unless the single retry also fails.

use std::io;
use thiserror::Error;

/// Result type for session and framer operations.
pub type HttpsResult<T> = Result<T, HttpsError>;

/// Where in an exchange the peer closed the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    /// While writing the request.
    Write,
    /// While reading the response head.
    Read,
}

impl std::fmt::Display for ExchangePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExchangePhase::Write => write!(f, "write"),
            ExchangePhase::Read => write!(f, "read"),
        }
    }
}

/// Errors from establishing a session or running an exchange on it.
#[derive(Debug, Error)]
pub enum HttpsError {
    /// Address resolution, TCP connect or TLS handshake failed.
    #[error("cannot connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },

    /// The peer closed the connection after part of the exchange had
    /// already gone through, or again right after a reconnect.
    #[error("connection reset by peer during {phase}")]
    ConnectionReset { phase: ExchangePhase },

    /// Low-level read failure (including end of stream inside a body).
    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    /// Low-level write failure.
    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    /// The response does not match the framing the client understands.
    #[error("framing error: {0}")]
    Framing(String),

    /// The server answered with a status outside 2xx.
    #[error("server returned HTTP {code}")]
    HttpStatus { code: u16 },
}

impl HttpsError {
    pub fn framing(msg: impl Into<String>) -> Self {
        Self::Framing(msg.into())
    }

    pub(crate) fn connect(host: &str, source: io::Error) -> Self {
        Self::Connect {
            host: host.to_string(),
            source,
        }
    }

    /// Status code carried by an `HttpStatus` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpsError::HttpStatus { code } => Some(*code),
            _ => None,
        }
    }
}
