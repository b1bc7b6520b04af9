/*
 * error.rs
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

//! Live-site endpoint errors.

use thiserror::Error;

use crate::protocol::https::HttpsError;

/// Result type for endpoint calls.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The exchange itself failed.
    #[error(transparent)]
    Https(#[from] HttpsError),

    /// The cookie lacks a field the site needs for writes.
    #[error("cookie has no {field} field")]
    MissingCookieField { field: &'static str },

    /// A response body lacks an expected numeric field.
    #[error("response has no {field} field")]
    MissingField { field: &'static str },
}
