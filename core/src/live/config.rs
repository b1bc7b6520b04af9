/*
 * config.rs
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

//! Room watcher timing and behaviour.

use std::time::Duration;

/// Settings shared by every room watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Pause between live-status polls.
    pub poll_interval: Duration,
    /// Extra pause after each heartbeat.
    pub heartbeat_pause: Duration,
    /// Delay between starting successive watchers.
    pub stagger: Duration,
    /// Bullet chat sent to every room when its watcher starts.
    pub greeting: String,
    /// Page size requested from the fan medal panel.
    pub medal_page_size: u32,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            heartbeat_pause: Duration::from_secs(30),
            stagger: Duration::from_secs(5),
            greeting: "1".to_string(),
            medal_page_size: 30,
        }
    }
}

impl WatchConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_heartbeat_pause(mut self, pause: Duration) -> Self {
        self.heartbeat_pause = pause;
        self
    }

    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Page size is at least 1.
    pub fn with_medal_page_size(mut self, size: u32) -> Self {
        self.medal_page_size = size.max(1);
        self
    }
}
