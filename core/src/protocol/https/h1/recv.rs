/*
 * recv.rs
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

//! Receive buffer and body decoders.
//!
//! [`RecvBuffer`] holds the bytes received for the current response that
//! have not been consumed yet. Consuming splits them off the front, so the
//! unconsumed region always starts at offset 0 and every length is checked
//! against what is actually buffered. Reads never ask the socket for more
//! than the decoder still needs for the item it is assembling, except when
//! looking for the end of a line.

use bytes::{Buf, Bytes, BytesMut};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::protocol::https::error::{HttpsError, HttpsResult};
use crate::protocol::https::h1::parser::{find_crlf, parse_chunk_size};

/// Scratch size for a single socket read.
pub const READ_CHUNK: usize = 4096;

/// Longest chunk-size or trailer line accepted.
pub const MAX_LINE: usize = 1024;

/// Accumulates response bytes across reads.
#[derive(Debug, Default)]
pub struct RecvBuffer {
    buf: BytesMut,
}

impl RecvBuffer {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(READ_CHUNK),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Drop `n` consumed bytes from the front.
    pub fn advance(&mut self, n: usize) -> HttpsResult<()> {
        if n > self.buf.len() {
            return Err(HttpsError::framing(format!(
                "cannot consume {} bytes, only {} buffered",
                n,
                self.buf.len()
            )));
        }
        self.buf.advance(n);
        Ok(())
    }

    /// One socket read of at most `limit` bytes appended to the buffer. Returns the count; 0 is end of stream.
    pub async fn read_some<S>(&mut self, stream: &mut S, limit: usize) -> io::Result<usize>
    where
        S: AsyncRead + Unpin,
    {
        let mut tmp = [0u8; READ_CHUNK];
        let want = limit.clamp(1, READ_CHUNK);
        let n = stream.read(&mut tmp[..want]).await?;
        self.buf.extend_from_slice(&tmp[..n]);
        Ok(n)
    }

    /// Like `read_some`, but end of stream is an error: the response is still incomplete.
    async fn fill<S>(&mut self, stream: &mut S, limit: usize) -> HttpsResult<()>
    where
        S: AsyncRead + Unpin,
    {
        match self.read_some(stream, limit).await {
            Ok(0) => Err(HttpsError::Read(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before the response was complete",
            ))),
            Ok(_) => Ok(()),
            Err(e) => Err(HttpsError::Read(e)),
        }
    }

    /// Exactly `n` bytes, reading more from the stream as needed.
    pub async fn read_exact<S>(&mut self, stream: &mut S, n: usize) -> HttpsResult<Bytes>
    where
        S: AsyncRead + Unpin,
    {
        while self.buf.len() < n {
            let missing = n - self.buf.len();
            self.fill(stream, missing).await?;
        }
        Ok(self.buf.split_to(n).freeze())
    }

    /// `n` data bytes followed by CRLF; the CRLF is checked and stripped.
    pub async fn read_chunk_data<S>(&mut self, stream: &mut S, n: usize) -> HttpsResult<Bytes>
    where
        S: AsyncRead + Unpin,
    {
        let total = n
            .checked_add(2)
            .ok_or_else(|| HttpsError::framing("chunk size overflows"))?;
        let mut data = self.read_exact(stream, total).await?;
        if !data.ends_with(b"\r\n") {
            return Err(HttpsError::framing(format!(
                "chunk of {} bytes is not followed by CRLF",
                n
            )));
        }
        data.truncate(n);
        Ok(data)
    }

    /// Next CRLF-terminated line, CRLF stripped.
    pub async fn read_line<S>(&mut self, stream: &mut S) -> HttpsResult<Bytes>
    where
        S: AsyncRead + Unpin,
    {
        let mut scanned = 0;
        loop {
            if let Some(i) = find_crlf(&self.buf[scanned..]) {
                let line = self.buf.split_to(scanned + i).freeze();
                self.buf.advance(2);
                return Ok(line);
            }
            if self.buf.len() > MAX_LINE {
                return Err(HttpsError::framing(format!(
                    "line longer than {} bytes",
                    MAX_LINE
                )));
            }
            scanned = self.buf.len().saturating_sub(1);
            self.fill(stream, READ_CHUNK).await?;
        }
    }
}

/// Body of exactly `len` bytes; whatever is already buffered counts toward it.
///
/// More bytes buffered than declared is a framing error: the head read
/// overshot the body the server announced.
pub async fn read_sized_body<S>(stream: &mut S, recv: &mut RecvBuffer, len: usize) -> HttpsResult<Bytes>
where
    S: AsyncRead + Unpin,
{
    if recv.len() > len {
        return Err(HttpsError::framing(format!(
            "{} body bytes received but Content-Length is {}",
            recv.len(),
            len
        )));
    }
    recv.read_exact(stream, len).await
}

/// Decode a chunked body. The result holds only chunk payloads, concatenated.
pub async fn read_chunked_body<S>(stream: &mut S, recv: &mut RecvBuffer) -> HttpsResult<Bytes>
where
    S: AsyncRead + Unpin,
{
    let mut body = BytesMut::new();
    loop {
        let line = recv.read_line(stream).await?;
        let size = parse_chunk_size(&line)?;
        if size == 0 {
            break;
        }
        let data = recv.read_chunk_data(stream, size).await?;
        body.extend_from_slice(&data);
    }
    // Trailer fields, then the blank line that ends the message.
    while !recv.read_line(stream).await?.is_empty() {}
    Ok(body.freeze())
}
