/*
 * api.rs
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

//! Endpoints of the live site, over one shared session.
//!
//! Each call builds a request, runs one exchange and, where a value is
//! needed, scans it out of the body text. The session serializes calls, so
//! one `LiveApi` can be shared by every room watcher.

use std::future::Future;
use tracing::debug;

use crate::live::cookie::CookieFields;
use crate::live::error::{ApiError, ApiResult};
use crate::net::{Connector, TlsConnector};
use crate::protocol::https::{multipart, urlencoded, Form, HttpsResult, Request, Session};
use crate::scan::{scan_all_uint, scan_uint};

/// Host serving every endpoint below.
pub const LIVE_API_HOST: &str = "api.live.bilibili.com";
/// Origin of the live room pages.
pub const LIVE_ORIGIN: &str = "https://live.bilibili.com";
/// Origin the heartbeat is sent from.
pub const MAIN_ORIGIN: &str = "https://www.bilibili.com";

/// White, the default bullet chat colour.
const BULLET_COLOR: &str = "16777215";
const BULLET_RND: &str = "1681331507";

const TIMESTAMP_KEY: &str = "\"timestamp\":";
const ROOM_ID_KEY: &str = "\"room_id\":";
const LIVE_STATUS_KEY: &str = "\"live_status\":";

/// The calls a room watcher makes. Implemented by [`LiveApi`].
pub trait RoomApi: Send + Sync {
    fn send_bullet_chat(&self, room: u64, msg: &str) -> impl Future<Output = ApiResult<()>> + Send;
    fn like_room(&self, room: u64) -> impl Future<Output = ApiResult<()>> + Send;
    /// 1 while the room is streaming.
    fn live_status(&self, room: u64) -> impl Future<Output = ApiResult<u64>> + Send;
    fn enter_room(&self, room: u64) -> impl Future<Output = ApiResult<()>> + Send;
    fn heartbeat(&self, room: u64) -> impl Future<Output = ApiResult<()>> + Send;
}

/// Logged-in client for the live site.
pub struct LiveApi<C: Connector = TlsConnector> {
    session: Session<C>,
    fields: CookieFields,
}

impl LiveApi<TlsConnector> {
    /// Connect to [`LIVE_API_HOST`] with `cookie` as the credential.
    pub async fn connect(cookie: &str) -> ApiResult<Self> {
        Self::connect_with(TlsConnector::default(), cookie).await
    }
}

impl<C: Connector> LiveApi<C> {
    /// The cookie must carry `bili_jct` and `DedeUserID`; it is checked before connecting.
    pub async fn connect_with(connector: C, cookie: &str) -> ApiResult<Self> {
        let fields = CookieFields::parse(cookie)?;
        let session = Session::establish_with(connector, LIVE_API_HOST, cookie).await?;
        Ok(Self { session, fields })
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub fn csrf_token(&self) -> &str {
        &self.fields.csrf_token
    }

    pub fn anchor_id(&self) -> &str {
        &self.fields.anchor_id
    }

    /// Daily sign-in. Returns the raw response body.
    pub async fn sign(&self) -> ApiResult<String> {
        Ok(self
            .get(Request::get("/xlive/web-ucenter/v1/sign/DoSign"))
            .await?)
    }

    /// Server time in seconds.
    pub async fn timestamp(&self) -> ApiResult<u64> {
        let body = self
            .get(Request::get("/xlive/open-interface/v1/rtc/getTimestamp"))
            .await?;
        scan_uint(&body, TIMESTAMP_KEY, 0)
            .map(|(ts, _)| ts)
            .ok_or(ApiError::MissingField { field: "timestamp" })
    }

    /// Rooms of the fan medals on the first panel page, in panel order.
    pub async fn medal_rooms(&self, page_size: u32) -> ApiResult<Vec<u64>> {
        let path = format!(
            "/xlive/app-ucenter/v1/fansMedal/panel?page=1&page_size={}",
            page_size
        );
        let body = self.get(Request::get(path)).await?;
        Ok(scan_all_uint(&body, ROOM_ID_KEY).collect())
    }

    pub async fn send_bullet_chat(&self, room: u64, msg: &str) -> ApiResult<()> {
        let room_id = room.to_string();
        let form = to_form(&[
            ("bubble", "0"),
            ("msg", msg),
            ("color", BULLET_COLOR),
            ("mode", "1"),
            ("fontsize", "25"),
            ("rnd", BULLET_RND),
            ("roomid", room_id.as_str()),
            ("csrf", self.csrf_token()),
            ("csrf_token", self.csrf_token()),
        ]);
        let request = Request::post("/msg/send")
            .with_body(multipart(&form))
            .header("Origin", LIVE_ORIGIN)
            .header("Referer", format!("{}/{}/", LIVE_ORIGIN, room));
        self.get(request).await?;
        Ok(())
    }

    /// Like the room. Costs two exchanges: the report carries the server time.
    pub async fn like_room(&self, room: u64) -> ApiResult<()> {
        let ts = self.timestamp().await?.to_string();
        let room_id = room.to_string();
        let form = to_form(&[
            ("room_id", room_id.as_str()),
            ("anchor_id", self.anchor_id()),
            ("ts", ts.as_str()),
            ("csrf", self.csrf_token()),
            ("csrf_token", self.csrf_token()),
            ("visit_id", ""),
        ]);
        let request = Request::post("/xlive/app-ucenter/v1/like_info_v3/like/likeReportV3")
            .with_body(urlencoded(&form));
        self.get(request).await?;
        Ok(())
    }

    pub async fn live_status(&self, room: u64) -> ApiResult<u64> {
        let path = format!("/xlive/web-room/v2/index/getRoomPlayInfo?room_id={}", room);
        let body = self.get(Request::get(path)).await?;
        scan_uint(&body, LIVE_STATUS_KEY, 0)
            .map(|(status, _)| status)
            .ok_or(ApiError::MissingField {
                field: "live_status",
            })
    }

    pub async fn enter_room(&self, room: u64) -> ApiResult<()> {
        let room_id = room.to_string();
        let form = to_form(&[
            ("room_id", room_id.as_str()),
            ("platform", "pc"),
            ("csrf_token", self.csrf_token()),
            ("csrf", self.csrf_token()),
            ("visit_id", ""),
        ]);
        let request = Request::post("/xlive/web-room/v1/index/roomEntryAction")
            .with_body(urlencoded(&form));
        self.get(request).await?;
        Ok(())
    }

    pub async fn heartbeat(&self, room: u64) -> ApiResult<()> {
        let request = Request::get("/relation/v1/Feed/heartBeat")
            .header("Origin", MAIN_ORIGIN)
            .header("Referer", format!("{}/{}", LIVE_ORIGIN, room));
        self.get(request).await?;
        Ok(())
    }

    /// Close the underlying session.
    pub async fn close(self) -> ApiResult<()> {
        Ok(self.session.close().await?)
    }

    async fn get(&self, request: Request) -> HttpsResult<String> {
        let body = self.session.exchange(&request).await?;
        debug!(path = %request.path, body = %body, "response");
        Ok(body)
    }
}

fn to_form(pairs: &[(&str, &str)]) -> Form {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl<C: Connector> RoomApi for LiveApi<C> {
    async fn send_bullet_chat(&self, room: u64, msg: &str) -> ApiResult<()> {
        Self::send_bullet_chat(self, room, msg).await
    }

    async fn like_room(&self, room: u64) -> ApiResult<()> {
        Self::like_room(self, room).await
    }

    async fn live_status(&self, room: u64) -> ApiResult<u64> {
        Self::live_status(self, room).await
    }

    async fn enter_room(&self, room: u64) -> ApiResult<()> {
        Self::enter_room(self, room).await
    }

    async fn heartbeat(&self, room: u64) -> ApiResult<()> {
        Self::heartbeat(self, room).await
    }
}

impl<C: Connector> std::fmt::Debug for LiveApi<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveApi")
            .field("session", &self.session)
            .field("anchor_id", &self.fields.anchor_id)
            .finish()
    }
}
