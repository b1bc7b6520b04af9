/*
 * mod.rs
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

//! HTTPS client: one keep-alive HTTP/1.1 connection per host over rustls.
//!
//! - `session`: the connection, its lock, idle-close recovery and the exchange loop.
//! - `request`: request model and wire serialization (Host and Cookie added last).
//! - `form`: multipart and urlencoded body encoders.
//! - `h1`: response head parsing and body decoding over a receive buffer
//!   (`Content-Length` or chunked).
//!
//! Not a general-purpose client: no redirects, no pooling, no pipelining,
//! no compression.

mod error;
pub mod form;
pub mod h1;
mod request;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ExchangePhase, HttpsError, HttpsResult};
pub use form::{multipart, urlencoded, EncodedBody, Form, MULTIPART_BOUNDARY};
pub use request::{Headers, Method, Request};
pub use session::{HttpsClient, Session, HEAD_WINDOW};
