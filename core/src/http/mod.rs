/*
 * mod.rs
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

//! HTTP message model: versions, methods, status codes, header fields,
//! cookies, and byte-level parsing and serialization of requests and
//! responses for HTTP/0.9, 1.0 and 1.1.

mod cookie;
mod error;
mod headers;
mod method;
mod request;
mod response;
mod status;

pub use cookie::{HttpCookie, SameSite};
pub use error::{HttpError, HttpErrorKind, HttpOp};
pub use headers::{HeaderFieldError, HttpHeaders};
pub use method::{register_method, unregister_method, Method};
pub use request::HttpRequest;
pub use response::HttpResponse;
pub use status::{register_status_code, unregister_status_code, StatusCode};

use std::fmt;

/// Protocol versions understood by the message model. Only 0.9, 1.0 and
/// 1.1 have wire codecs here; 2.0 and 3.0 are named so callers can label
/// messages obtained elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVersion {
    Http09,
    Http10,
    Http11,
    Http20,
    Http30,
}

impl HttpVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVersion::Http09 => "HTTP/0.9",
            HttpVersion::Http10 => "HTTP/1.0",
            HttpVersion::Http11 => "HTTP/1.1",
            HttpVersion::Http20 => "HTTP/2.0",
            HttpVersion::Http30 => "HTTP/3.0",
        }
    }

    pub fn from_token(token: &str) -> Option<HttpVersion> {
        match token {
            "HTTP/0.9" => Some(HttpVersion::Http09),
            "HTTP/1.0" => Some(HttpVersion::Http10),
            "HTTP/1.1" => Some(HttpVersion::Http11),
            "HTTP/2.0" => Some(HttpVersion::Http20),
            "HTTP/3.0" => Some(HttpVersion::Http30),
            _ => None,
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the method and status code registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The numeric identifier is already bound to a built-in entry.
    CannotReregister,
    /// The numeric identifier is already bound to a custom entry.
    AlreadyRegistered,
    /// No entry with this identifier exists.
    DoesNotExist,
    /// Built-in entries cannot be removed.
    CannotUnregister,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            RegistryError::CannotReregister => "identifier is bound to a built-in entry",
            RegistryError::AlreadyRegistered => "identifier is already registered",
            RegistryError::DoesNotExist => "no such registry entry",
            RegistryError::CannotUnregister => "built-in entries cannot be unregistered",
        };
        f.write_str(text)
    }
}

impl std::error::Error for RegistryError {}

/// Position of the first CRLF in `buf`, if any.
pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|pair| pair == b"\r\n")
}

/// Parse the header block following a start line. `buf` begins right
/// after the start line's CRLF. An empty `buf` means no headers and no
/// payload; otherwise header lines run until an empty line, and the
/// payload is whatever follows it. Fields are sorted by name and value
/// before insertion, so equivalent messages parse identically.
pub(crate) fn parse_header_block(buf: &[u8], op: HttpOp) -> Result<(HttpHeaders, Vec<u8>), HttpError> {
    let mut headers = HttpHeaders::new();
    if buf.is_empty() {
        return Ok((headers, Vec::new()));
    }

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut rest = buf;
    loop {
        let eol = find_crlf(rest).ok_or_else(|| HttpError::new(op, HttpErrorKind::Generic))?;
        let line = &rest[..eol];
        rest = &rest[eol + 2..];
        if line.is_empty() {
            break;
        }
        let line = std::str::from_utf8(line)
            .map_err(|_| HttpError::new(op, HttpErrorKind::Generic))?;
        let (name, value) = line
            .split_once(": ")
            .ok_or_else(|| HttpError::new(op, HttpErrorKind::Generic))?;
        pairs.push((name.to_ascii_lowercase(), value.to_string()));
    }

    pairs.sort();
    for (name, value) in pairs {
        headers.add(&name, &value).map_err(|e| match e {
            HeaderFieldError::InvalidName(name) => {
                HttpError::with_detail(op, HttpErrorKind::InvalidHeaderName, name)
            }
            HeaderFieldError::InvalidValue(value) => {
                HttpError::with_detail(op, HttpErrorKind::InvalidHeaderValue, value)
            }
        })?;
    }

    Ok((headers, rest.to_vec()))
}

/// Serialize a header block: fields sorted by name and value, each
/// revalidated, each written as `name: value` CRLF. The terminating
/// empty line is the caller's concern.
pub(crate) fn serialize_header_block(headers: &HttpHeaders, op: HttpOp) -> Result<Vec<u8>, HttpError> {
    let mut sorted = headers.clone();
    sorted.sort();
    let mut out = Vec::new();
    for (name, value) in sorted.iter() {
        if !HttpHeaders::is_valid_header_name(name) {
            return Err(HttpError::with_detail(op, HttpErrorKind::InvalidHeaderName, name));
        }
        if !HttpHeaders::is_valid_header_value(value) {
            return Err(HttpError::with_detail(op, HttpErrorKind::InvalidHeaderValue, value));
        }
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_tokens_round_trip() {
        for version in [
            HttpVersion::Http09,
            HttpVersion::Http10,
            HttpVersion::Http11,
            HttpVersion::Http20,
            HttpVersion::Http30,
        ] {
            assert_eq!(HttpVersion::from_token(version.as_str()), Some(version));
        }
        assert_eq!(HttpVersion::from_token("HTTP/1.2"), None);
    }

    #[test]
    fn finds_crlf() {
        assert_eq!(find_crlf(b"GET / HTTP/1.1\r\n"), Some(14));
        assert_eq!(find_crlf(b"no terminator"), None);
        assert_eq!(find_crlf(b"\r\n"), Some(0));
    }
}
