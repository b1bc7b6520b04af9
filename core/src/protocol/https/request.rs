/*
 * request.rs
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

//! HTTP request: method, path, headers, optional body, and its wire form.

use std::collections::HashMap;

use crate::protocol::https::form::EncodedBody;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Extra request headers. Order on the wire is unspecified.
pub type Headers = HashMap<String, String>;

const DEFAULT_HEADERS: [(&str, &str); 5] = [
    ("Connection", "keep-alive"),
    ("Accept", "*/*"),
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36",
    ),
    ("Accept-Encoding", "identity"),
    ("Accept-Language", "zh-CN,zh;q=0.9"),
];

/// A request for one exchange.
///
/// `Host` and `Cookie` are added by the session when the request is
/// serialized; callers must not set them here.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path with any query string already embedded.
    pub path: String,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Request with the default header set (keep-alive, identity encoding, browser user agent).
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Self::default_headers(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn default_headers() -> Headers {
        DEFAULT_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Add or replace a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach an encoded form body together with its Content-Type and Content-Length.
    pub fn with_body(mut self, body: EncodedBody) -> Self {
        self.headers
            .insert("Content-Length".to_string(), body.bytes.len().to_string());
        self.headers
            .insert("Content-Type".to_string(), body.content_type);
        self.body = Some(body.bytes);
        self
    }

    /// Serialize for the wire: request line, Host, headers, Cookie, blank line, body.
    pub fn to_wire(&self, host: &str, credential: &str) -> Vec<u8> {
        let mut head = format!(
            "{} {} HTTP/1.1\r\nHost: {}\r\n",
            self.method.as_str(),
            self.path,
            host
        );
        for (k, v) in &self.headers {
            head.push_str(k);
            head.push_str(": ");
            head.push_str(v);
            head.push_str("\r\n");
        }
        head.push_str("Cookie: ");
        head.push_str(credential);
        head.push_str("\r\n\r\n");

        let body = self.body.as_deref().unwrap_or_default();
        let mut wire = Vec::with_capacity(head.len() + body.len());
        wire.extend_from_slice(head.as_bytes());
        wire.extend_from_slice(body);
        wire
    }
}
