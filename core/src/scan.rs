/*
 * scan.rs
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

//! Integer field scanner for loosely JSON-shaped response bodies.
//!
//! Site responses are read by looking for a literal key such as
//! `"room_id":` and taking the decimal digits that follow. No JSON is
//! parsed: nesting, quoting and the character after the number are not
//! checked.

/// Find `key` at or after byte offset `from` and read the unsigned decimal
/// number right after it.
///
/// Returns the value and the offset just past its last digit, suitable as
/// the next `from`. `None` if `key` does not occur (or `from` is out of
/// range). Digits accumulate until the first non-digit byte; a key followed
/// directly by a non-digit yields 0. Values past `u64::MAX` saturate.
pub fn scan_uint(text: &str, key: &str, from: usize) -> Option<(u64, usize)> {
    let start = from + text.get(from..)?.find(key)? + key.len();
    let digits = text.as_bytes()[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    let value = text.as_bytes()[start..start + digits]
        .iter()
        .fold(0u64, |acc, b| {
            acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
        });
    Some((value, start + digits))
}

/// Every number following `key`, in document order.
pub fn scan_all_uint<'a>(text: &'a str, key: &'a str) -> ScanUint<'a> {
    ScanUint { text, key, pos: 0 }
}

/// Iterator returned by [`scan_all_uint`].
#[derive(Debug, Clone)]
pub struct ScanUint<'a> {
    text: &'a str,
    key: &'a str,
    pos: usize,
}

impl Iterator for ScanUint<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let (value, next) = scan_uint(self.text, self.key, self.pos)?;
        self.pos = next;
        Some(value)
    }
}
