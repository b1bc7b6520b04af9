/*
 * lib.rs
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

//! Livekeeper core: a keep-alive HTTPS session with its own HTTP/1.1 framer,
//! and the live-site client built on it.

pub mod live;
pub mod net;
pub mod protocol;
pub mod scan;

pub use live::{LiveApi, WatchConfig};
pub use net::{Connector, TlsConnector};
pub use protocol::https::{HttpsClient, HttpsError, Request, Session};
