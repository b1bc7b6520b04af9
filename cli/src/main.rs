/*
 * main.rs
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

//! livekeeper entry point: sign in, then watch every room on one shared session.

mod cli;
mod error;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use livekeeper_core::live::{watch_room, LiveApi, WatchConfig, LIVE_API_HOST};

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

const DEFAULT_FILTER: &str = "livekeeper=info,livekeeper_core=info";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "livekeeper stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let cookie = cli.load_cookie().await?;
    let config = cli.watch_config();

    let api = Arc::new(LiveApi::connect(&cookie).await?);
    info!(host = LIVE_API_HOST, "connected");

    let outcome = watch_all(Arc::clone(&api), &cli, &config).await;

    // Every watcher has been joined by now, so this is the last handle.
    match Arc::try_unwrap(api) {
        Ok(api) => {
            if let Err(e) = api.close().await {
                debug!(error = %e, "closing session");
            }
        }
        Err(_) => warn!("session still shared at exit, not closed"),
    }
    outcome
}

async fn watch_all(api: Arc<LiveApi>, cli: &Cli, config: &WatchConfig) -> CliResult<()> {
    if !cli.no_sign {
        match api.sign().await {
            Ok(response) => info!(%response, "daily sign-in"),
            Err(e) => warn!(error = %e, "daily sign-in failed"),
        }
    }

    let rooms = if cli.room.is_empty() {
        api.medal_rooms(config.medal_page_size).await?
    } else {
        cli.room.clone()
    };
    if rooms.is_empty() {
        return Err(CliError::Config("no rooms to watch".to_string()));
    }
    info!(count = rooms.len(), ?rooms, "watching rooms");

    let mut watchers = JoinSet::new();
    for (i, room) in rooms.into_iter().enumerate() {
        if i > 0 {
            sleep(config.stagger).await;
        }
        let api = Arc::clone(&api);
        let config = config.clone();
        watchers.spawn(async move {
            watch_room(api.as_ref(), room, &config).await;
            room
        });
    }

    while let Some(joined) = watchers.join_next().await {
        match joined {
            Ok(room) => warn!(room, "watcher returned"),
            Err(e) => error!(error = %e, "watcher task failed"),
        }
    }
    Ok(())
}
