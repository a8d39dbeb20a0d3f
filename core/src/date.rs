/*
 * date.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Vnet, a blocking networking library.
 *
 * Vnet is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Vnet is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Vnet.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Timestamp wrapper for HTTP headers and cookie expirations: unix seconds
//! with RFC 1123 (`Sun, 06 Nov 1994 08:49:37 GMT`) and ISO 8601 rendering.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

/// A point in time with second precision. Ordered and comparable; copyable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    seconds: i64,
}

impl Date {
    pub fn now() -> Date {
        Date {
            seconds: Utc::now().timestamp(),
        }
    }

    pub fn from_unix_seconds(seconds: i64) -> Date {
        Date { seconds }
    }

    pub fn from_system_time(time: SystemTime) -> Date {
        let seconds = match time.duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        };
        Date { seconds }
    }

    pub fn unix_seconds(&self) -> i64 {
        self.seconds
    }

    pub fn add_seconds(&self, seconds: i64) -> Date {
        Date {
            seconds: self.seconds.saturating_add(seconds),
        }
    }

    fn utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.seconds, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// RFC 1123 rendering, the format HTTP dates and cookie `Expires` use.
    pub fn to_utc_string(&self) -> String {
        self.utc().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }

    pub fn to_iso8601_string(&self) -> String {
        self.utc().format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}
