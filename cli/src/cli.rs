/*
 * cli.rs
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

//! Command-line interface definition.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use livekeeper_core::WatchConfig;

use crate::error::{CliError, CliResult};

/// livekeeper - keep the live rooms of your fan medals warm
#[derive(Debug, Parser)]
#[command(name = "livekeeper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Login cookie (must contain bili_jct and DedeUserID)
    #[arg(long, env = "LIVEKEEPER_COOKIE", hide_env_values = true)]
    pub cookie: Option<String>,

    /// Read the login cookie from this file instead
    #[arg(long)]
    pub cookie_file: Option<PathBuf>,

    /// Room to watch (can be repeated); defaults to the rooms of your fan medals
    #[arg(long, action = clap::ArgAction::Append)]
    pub room: Vec<u64>,

    /// Seconds between live-status polls
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: u64,

    /// Extra seconds to wait after each heartbeat
    #[arg(long, default_value_t = 30)]
    pub heartbeat_interval: u64,

    /// Seconds between starting successive room watchers
    #[arg(long, default_value_t = 5)]
    pub stagger: u64,

    /// Bullet chat sent to each room when its watcher starts
    #[arg(long, default_value = "1")]
    pub greeting: String,

    /// Rooms requested per fan medal page
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    pub medal_page_size: u32,

    /// Skip the daily sign-in
    #[arg(long)]
    pub no_sign: bool,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,
}

impl Cli {
    /// The cookie from `--cookie-file` if given, else from `--cookie` / `LIVEKEEPER_COOKIE`.
    pub async fn load_cookie(&self) -> CliResult<String> {
        let raw = match (&self.cookie_file, &self.cookie) {
            (Some(path), _) => tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CliError::Io {
                    path: path.clone(),
                    source,
                })?,
            (None, Some(cookie)) => cookie.clone(),
            (None, None) => {
                return Err(CliError::Config(
                    "no cookie: pass --cookie, --cookie-file or set LIVEKEEPER_COOKIE".to_string(),
                ))
            }
        };
        normalize_cookie(&raw)
    }

    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig::default()
            .with_poll_interval(Duration::from_secs(self.poll_interval))
            .with_heartbeat_pause(Duration::from_secs(self.heartbeat_interval))
            .with_stagger(Duration::from_secs(self.stagger))
            .with_greeting(self.greeting.as_str())
            .with_medal_page_size(self.medal_page_size)
    }
}

/// Trim surrounding whitespace and a trailing newline; an empty cookie is a config error.
fn normalize_cookie(raw: &str) -> CliResult<String> {
    let cookie = raw.trim();
    if cookie.is_empty() {
        return Err(CliError::Config("cookie is empty".to_string()));
    }
    Ok(cookie.to_string())
}
