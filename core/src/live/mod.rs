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

//! Live-site client and room watcher.

pub mod api;
pub mod config;
pub mod cookie;
pub mod error;
pub mod watcher;

pub use api::{LiveApi, RoomApi, LIVE_API_HOST};
pub use config::WatchConfig;
pub use cookie::{cookie_field, CookieFields};
pub use error::{ApiError, ApiResult};
pub use watcher::{greet, poll_once, watch_room, Action, RoomState};
