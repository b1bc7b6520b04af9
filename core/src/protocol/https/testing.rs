/*
 * testing.rs
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

//! Scripted connector for session tests: each connection replays a fixed
//! sequence of read and write outcomes and records what was written.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::net::Connector;

/// What the next read on a scripted stream returns.
#[derive(Debug, Clone)]
pub enum ReadStep {
    /// Deliver these bytes (split across reads if the caller's buffer is smaller).
    Data(Vec<u8>),
    /// End of stream.
    Eof,
    /// Local I/O failure.
    Fail,
    /// I/O error of this kind.
    Error(io::ErrorKind),
}

/// What the next write on a scripted stream does.
#[derive(Debug, Clone, Copy)]
pub enum WriteStep {
    Accept,
    /// Accept at most this many bytes.
    Partial(usize),
    /// Report zero bytes written.
    Zero,
    /// Local I/O failure.
    Fail,
    /// I/O error of this kind.
    Error(io::ErrorKind),
}

/// Behaviour of one connection. Reads past the script are end of stream;
/// writes past the script are accepted in full.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub reads: Vec<ReadStep>,
    pub writes: Vec<WriteStep>,
}

impl Script {
    /// Connection that answers with `chunks`, one read each.
    pub fn respond(chunks: &[&[u8]]) -> Self {
        Self {
            reads: chunks.iter().map(|c| ReadStep::Data(c.to_vec())).collect(),
            writes: Vec::new(),
        }
    }

    pub fn with_writes(mut self, writes: &[WriteStep]) -> Self {
        self.writes = writes.to_vec();
        self
    }

    pub fn then(mut self, step: ReadStep) -> Self {
        self.reads.push(step);
        self
    }
}

#[derive(Default)]
struct State {
    scripts: VecDeque<Script>,
    written: Vec<Vec<u8>>,
    shutdowns: usize,
}

/// Hands out one scripted stream per connect; fails once the scripts run out.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    state: Arc<Mutex<State>>,
}

impl ScriptedConnector {
    pub fn new(scripts: Vec<Script>) -> Self {
        let state = State {
            scripts: scripts.into(),
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Number of connections opened so far.
    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().written.len()
    }

    /// Bytes written on connection `index`.
    pub fn written(&self, index: usize) -> Vec<u8> {
        self.state.lock().unwrap().written[index].clone()
    }

    pub fn shutdowns(&self) -> usize {
        self.state.lock().unwrap().shutdowns
    }
}

impl Connector for ScriptedConnector {
    type Stream = ScriptedStream;

    async fn connect(&self, _host: &str) -> io::Result<ScriptedStream> {
        let mut state = self.state.lock().unwrap();
        let script = state.scripts.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::ConnectionRefused, "no scripted connection left")
        })?;
        let index = state.written.len();
        state.written.push(Vec::new());
        Ok(ScriptedStream {
            reads: script.reads.into(),
            writes: script.writes.into(),
            index,
            state: Arc::clone(&self.state),
        })
    }
}

pub struct ScriptedStream {
    reads: VecDeque<ReadStep>,
    writes: VecDeque<WriteStep>,
    index: usize,
    state: Arc<Mutex<State>>,
}

impl AsyncRead for ScriptedStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.reads.pop_front() {
            None | Some(ReadStep::Eof) => Poll::Ready(Ok(())),
            Some(ReadStep::Fail) => Poll::Ready(Err(io::Error::other("scripted read failure"))),
            Some(ReadStep::Error(kind)) => {
                Poll::Ready(Err(io::Error::new(kind, "scripted read error")))
            }
            Some(ReadStep::Data(mut data)) => {
                let n = data.len().min(buf.remaining());
                buf.put_slice(&data[..n]);
                if n < data.len() {
                    let rest = data.split_off(n);
                    self.reads.push_front(ReadStep::Data(rest));
                }
                Poll::Ready(Ok(()))
            }
        }
    }
}

impl AsyncWrite for ScriptedStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let n = match self.writes.pop_front().unwrap_or(WriteStep::Accept) {
            WriteStep::Accept => buf.len(),
            WriteStep::Partial(max) => max.min(buf.len()),
            WriteStep::Zero => 0,
            WriteStep::Fail => {
                return Poll::Ready(Err(io::Error::other("scripted write failure")))
            }
            WriteStep::Error(kind) => {
                return Poll::Ready(Err(io::Error::new(kind, "scripted write error")))
            }
        };
        self.state.lock().unwrap().written[self.index].extend_from_slice(&buf[..n]);
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.state.lock().unwrap().shutdowns += 1;
        Poll::Ready(Ok(()))
    }
}
