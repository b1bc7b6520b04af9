/*
 * parser.rs
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

//! HTTP/1.1 response head parsing: terminator search, status line, body framing, chunk sizes.

use crate::protocol::https::error::{HttpsError, HttpsResult};

/// Blank line that ends the response head.
pub const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Find CRLF in buf; return the offset of the CR, or None if not found.
pub fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Offset of the head terminator at or after `from`.
pub fn find_head_end(buf: &[u8], from: usize) -> Option<usize> {
    if from >= buf.len() {
        return None;
    }
    buf[from..]
        .windows(HEAD_TERMINATOR.len())
        .position(|w| w == HEAD_TERMINATOR)
        .map(|p| p + from)
}

/// How the response body is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFraming {
    /// No body (204).
    Empty,
    /// `Content-Length` bytes follow the head.
    Length(usize),
    /// Chunked transfer coding (no Content-Length header).
    Chunked,
}

/// Status code and framing of a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHead {
    pub code: u16,
    pub framing: BodyFraming,
}

impl ResponseHead {
    /// Parse the head (status line and headers, terminator excluded).
    ///
    /// Fails with `HttpStatus` for any non-2xx code and with `Framing` for a
    /// malformed status line or Content-Length value.
    pub fn parse(head: &[u8]) -> HttpsResult<Self> {
        let text = std::str::from_utf8(head)
            .map_err(|_| HttpsError::framing("response head is not valid UTF-8"))?;
        let mut lines = text.split("\r\n");
        let code = parse_status_line(lines.next().unwrap_or_default())?;
        if code / 100 != 2 {
            return Err(HttpsError::HttpStatus { code });
        }
        if code == 204 {
            return Ok(Self {
                code,
                framing: BodyFraming::Empty,
            });
        }
        for line in lines {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case("content-length") {
                let len = value.trim().parse::<usize>().map_err(|_| {
                    HttpsError::framing(format!("invalid Content-Length: {:?}", value.trim()))
                })?;
                return Ok(Self {
                    code,
                    framing: BodyFraming::Length(len),
                });
            }
        }
        Ok(Self {
            code,
            framing: BodyFraming::Chunked,
        })
    }
}

/// `HTTP/1.1 200 OK` or `HTTP/1.1 200` -> 200.
fn parse_status_line(line: &str) -> HttpsResult<u16> {
    let malformed = || HttpsError::framing(format!("malformed status line: {:?}", line));
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/1.") {
        return Err(malformed());
    }
    let code = parts.next().unwrap_or_default();
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    code.parse::<u16>().map_err(|_| malformed())
}

/// Parse a chunk-size line (CRLF already stripped): hex digits, optional `;extension`.
pub fn parse_chunk_size(line: &[u8]) -> HttpsResult<usize> {
    let invalid = || {
        HttpsError::framing(format!(
            "invalid chunk size line: {:?}",
            String::from_utf8_lossy(line)
        ))
    };
    let text = std::str::from_utf8(line).map_err(|_| invalid())?;
    let hex = text.split(';').next().unwrap_or(text).trim();
    if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    usize::from_str_radix(hex, 16).map_err(|_| invalid())
}
