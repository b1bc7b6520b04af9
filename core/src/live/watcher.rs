/*
 * watcher.rs
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

//! Per-room watcher: greet once, then follow the room's live status.
//!
//! While a room streams, a heartbeat goes out every cycle so the watch time
//! counts toward the fan medal. The watcher runs until its task is aborted;
//! a failed cycle is logged and the next one starts after the usual pause.

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::live::api::RoomApi;
use crate::live::config::WatchConfig;
use crate::live::error::ApiResult;

/// `live_status` value of a streaming room.
pub const LIVE: u64 = 1;

/// Whether the watcher last saw the room streaming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoomState {
    #[default]
    Offline,
    Live,
}

/// What a poll result asks the watcher to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The stream just started.
    EnterRoom,
    /// The stream goes on.
    Heartbeat,
    /// The stream just ended.
    StreamEnded,
    Idle,
}

impl RoomState {
    /// Next state and action for a polled `live_status`.
    pub fn on_status(self, live_status: u64) -> (RoomState, Action) {
        match (self, live_status == LIVE) {
            (RoomState::Offline, true) => (RoomState::Live, Action::EnterRoom),
            (RoomState::Live, true) => (RoomState::Live, Action::Heartbeat),
            (RoomState::Live, false) => (RoomState::Offline, Action::StreamEnded),
            (RoomState::Offline, false) => (RoomState::Offline, Action::Idle),
        }
    }
}

/// Send the greeting bullet chat and a like.
pub async fn greet<A: RoomApi>(api: &A, room: u64, greeting: &str) -> ApiResult<()> {
    api.send_bullet_chat(room, greeting).await?;
    api.like_room(room).await
}

/// One cycle: poll the status and carry out the resulting action.
///
/// The returned state is the one to poll from next. On error nothing
/// advances, so an entry that failed is tried again next cycle.
pub async fn poll_once<A: RoomApi>(api: &A, room: u64, state: RoomState) -> ApiResult<(RoomState, Action)> {
    let status = api.live_status(room).await?;
    let (next, action) = state.on_status(status);
    match action {
        Action::EnterRoom => api.enter_room(room).await?,
        Action::Heartbeat => api.heartbeat(room).await?,
        Action::StreamEnded | Action::Idle => {}
    }
    Ok((next, action))
}

/// Watch `room` forever.
pub async fn watch_room<A: RoomApi>(api: &A, room: u64, config: &WatchConfig) {
    match greet(api, room, &config.greeting).await {
        Ok(()) => info!(room, "bullet chat and like sent"),
        Err(e) => warn!(room, error = %e, "greeting failed"),
    }
    let mut state = RoomState::default();
    loop {
        match poll_once(api, room, state).await {
            Ok((next, action)) => {
                match action {
                    Action::EnterRoom => info!(room, "stream started"),
                    Action::StreamEnded => info!(room, "stream ended"),
                    Action::Heartbeat => {
                        debug!(room, "heartbeat sent");
                        sleep(config.heartbeat_pause).await;
                    }
                    Action::Idle => debug!(room, "offline"),
                }
                state = next;
            }
            Err(e) => warn!(room, error = %e, "poll cycle failed"),
        }
        sleep(config.poll_interval).await;
    }
}
