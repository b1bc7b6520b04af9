/*
 * cookie.rs
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

//! Fields the endpoints need from the login cookie.

use crate::live::error::{ApiError, ApiResult};

const CSRF_FIELD: &str = "bili_jct";
const USER_ID_FIELD: &str = "DedeUserID";

/// Value of the cookie pair named `name`, up to the next `;`.
pub fn cookie_field<'a>(cookie: &'a str, name: &str) -> Option<&'a str> {
    cookie.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim())
    })
}

/// Credentials taken from the cookie: csrf token for writes, user id for likes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieFields {
    pub csrf_token: String,
    pub anchor_id: String,
}

impl CookieFields {
    pub fn parse(cookie: &str) -> ApiResult<Self> {
        let field = |name: &'static str| {
            cookie_field(cookie, name)
                .map(str::to_string)
                .ok_or(ApiError::MissingCookieField { field: name })
        };
        Ok(Self {
            csrf_token: field(CSRF_FIELD)?,
            anchor_id: field(USER_ID_FIELD)?,
        })
    }
}
