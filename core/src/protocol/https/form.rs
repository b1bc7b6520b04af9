/*
 * form.rs
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

//! Form body encoders: multipart/form-data and application/x-www-form-urlencoded.
//!
//! Both are pure functions from ordered (name, value) pairs to an
//! [`EncodedBody`]; `Request::with_body` adds the matching Content-Type and
//! Content-Length headers.

/// Ordered form fields.
pub type Form = Vec<(String, String)>;

/// Multipart boundary shared by every request.
///
/// Field values must not contain this string: there is no collision check,
/// and a value that embeds it breaks the part framing.
pub const MULTIPART_BOUNDARY: &str = "----WebKitFormBoundaryiCOaB9gbVqcDvzin";

/// An encoded request body and the Content-Type that describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Encode as multipart/form-data with [`MULTIPART_BOUNDARY`].
pub fn multipart(form: &[(String, String)]) -> EncodedBody {
    let mut data = String::new();
    for (name, value) in form {
        data.push_str("--");
        data.push_str(MULTIPART_BOUNDARY);
        data.push_str("\r\nContent-Disposition: form-data; name=\"");
        data.push_str(name);
        data.push_str("\"\r\n\r\n");
        data.push_str(value);
        data.push_str("\r\n");
    }
    data.push_str("--");
    data.push_str(MULTIPART_BOUNDARY);
    data.push_str("--\r\n");
    EncodedBody {
        bytes: data.into_bytes(),
        content_type: format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
    }
}

/// Encode as `name=value` pairs joined with `&`. Names and values are not escaped.
pub fn urlencoded(form: &[(String, String)]) -> EncodedBody {
    let data = form
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&");
    EncodedBody {
        bytes: data.into_bytes(),
        content_type: "application/x-www-form-urlencoded".to_string(),
    }
}
