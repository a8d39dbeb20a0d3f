/*
 * uri.rs
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

//! URI parser: scheme/userinfo/host/port/path/query/fragment with strict
//! character-class validation (RFC 3986 unreserved + reserved + `%`).
//! Inputs starting with `/` take the relative fast path (no scheme, no
//! authority). Query and fragment are captured verbatim; the percent
//! encode/decode helpers at the bottom are for callers building components.

use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Inputs at or beyond this length are rejected outright.
pub const MAX_URI_LEN: usize = 32768;

/// Errors from `Uri::parse`. A closed set; parsing aborts on the first
/// violation, there is no recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriError {
    TooLong,
    InvalidCharacters,
    SchemeMissing,
    SchemeEmpty,
    SchemeInvalidCharacters,
    HostFormat,
    HostEmpty,
    NonNumericalPort,
    PathMissing,
}

impl fmt::Display for UriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            UriError::TooLong => "URI too long",
            UriError::InvalidCharacters => "URI contains invalid character(s)",
            UriError::SchemeMissing => "scheme missing",
            UriError::SchemeEmpty => "scheme is an empty string",
            UriError::SchemeInvalidCharacters => "scheme contains invalid character(s)",
            UriError::HostFormat => "malformed host",
            UriError::HostEmpty => "host is an empty string",
            UriError::NonNumericalPort => "non-numerical port",
            UriError::PathMissing => "URI has no path",
        };
        write!(f, "bad URI: {}", msg)
    }
}

impl std::error::Error for UriError {}

/// A parsed URI. Immutable after construction; equality is structural over
/// the components. Invariant: `path` is present and `/`-leading, or `host`
/// is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    scheme: Option<String>,
    userinfo: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    path: Option<String>,
    query: Option<String>,
    fragment: Option<String>,
}

impl Uri {
    pub fn parse(input: &str) -> Result<Uri, UriError> {
        if input.len() >= MAX_URI_LEN {
            return Err(UriError::TooLong);
        }
        if input.bytes().any(|b| !is_uri_byte(b)) {
            return Err(UriError::InvalidCharacters);
        }

        // Relative fast path: path?query#fragment only.
        if input.starts_with('/') {
            let (path, query, fragment) = split_path_query_fragment(input);
            return Ok(Uri {
                scheme: None,
                userinfo: None,
                host: None,
                port: None,
                path: Some(normalize_path(path)),
                query,
                fragment,
            });
        }

        let colon = input.find(':').ok_or(UriError::SchemeMissing)?;
        let scheme = &input[..colon];
        if scheme.is_empty() {
            return Err(UriError::SchemeEmpty);
        }
        if !scheme
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'.' || b == b'-')
        {
            return Err(UriError::SchemeInvalidCharacters);
        }
        let scheme = scheme.to_ascii_lowercase();

        let mut rest = &input[colon + 1..];
        let mut userinfo = None;
        let mut host = None;
        let mut port = None;

        if let Some(after) = rest.strip_prefix("//") {
            let authority_end = after.find('/').unwrap_or(after.len());
            let mut authority = &after[..authority_end];
            rest = &after[authority_end..];

            if let Some(at) = authority.rfind('@') {
                userinfo = Some(authority[..at].to_string());
                authority = &authority[at + 1..];
            }

            let (host_part, port_part) = if authority.starts_with('[') {
                // IPv6 literal: find the closing bracket, the port (if any)
                // follows it. The colon split used for regular hosts would
                // be ambiguous here.
                let close = authority.find(']').ok_or(UriError::HostFormat)?;
                if close == 1 {
                    return Err(UriError::HostEmpty);
                }
                let tail = &authority[close + 1..];
                let port_part = match tail.strip_prefix(':') {
                    Some(p) => Some(p),
                    None if tail.is_empty() => None,
                    None => return Err(UriError::HostFormat),
                };
                (&authority[..close + 1], port_part)
            } else {
                match authority.find(':') {
                    Some(i) => (&authority[..i], Some(&authority[i + 1..])),
                    None => (authority, None),
                }
            };

            if host_part.is_empty() {
                return Err(UriError::HostEmpty);
            }
            host = Some(host_part.to_ascii_lowercase());

            if let Some(p) = port_part {
                if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(UriError::NonNumericalPort);
                }
                port = Some(p.parse::<u16>().map_err(|_| UriError::NonNumericalPort)?);
            }
        } else if rest.is_empty() {
            return Err(UriError::PathMissing);
        }

        let (path, query, fragment) = split_path_query_fragment(rest);
        Ok(Uri {
            scheme: Some(scheme),
            userinfo,
            host,
            port,
            path: Some(normalize_path(path)),
            query,
            fragment,
        })
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn userinfo(&self) -> Option<&str> {
        self.userinfo.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{}:", scheme)?;
        }
        if let Some(host) = &self.host {
            f.write_str("//")?;
            if let Some(userinfo) = &self.userinfo {
                write!(f, "{}@", userinfo)?;
            }
            f.write_str(host)?;
            if let Some(port) = self.port {
                write!(f, ":{}", port)?;
            }
        }
        if let Some(path) = &self.path {
            f.write_str(path)?;
        }
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

/// True for bytes a URI may contain: RFC 3986 unreserved, reserved, and `%`.
fn is_uri_byte(b: u8) -> bool {
    if b.is_ascii_alphanumeric() {
        return true;
    }
    matches!(
        b,
        b'-' | b'_'
            | b'.'
            | b'~'
            | b':'
            | b'/'
            | b'?'
            | b'#'
            | b'['
            | b']'
            | b'@'
            | b'!'
            | b'$'
            | b'&'
            | b'\''
            | b'('
            | b')'
            | b'*'
            | b'+'
            | b','
            | b';'
            | b'='
            | b'%'
    )
}

/// Split a path tail into (path, query, fragment). The query runs from the
/// first `?` up to any `#`; the fragment runs from the first `#` to the end.
/// Empty query/fragment strings are omitted.
fn split_path_query_fragment(tail: &str) -> (&str, Option<String>, Option<String>) {
    let mut path = tail;
    if let Some(q) = path.find('?') {
        path = &path[..q];
    }
    if let Some(h) = path.find('#') {
        path = &path[..h];
    }

    let query = tail
        .find('?')
        .map(|q| {
            let q = &tail[q + 1..];
            match q.find('#') {
                Some(h) => &q[..h],
                None => q,
            }
        })
        .filter(|q| !q.is_empty())
        .map(str::to_string);

    let fragment = tail
        .find('#')
        .map(|h| &tail[h + 1..])
        .filter(|frag| !frag.is_empty())
        .map(str::to_string);

    (path, query, fragment)
}

/// Normalize a path: default to `/` when empty, prepend `/` when missing,
/// collapse duplicate slashes, strip the trailing slash except for root.
fn normalize_path(path: &str) -> String {
    let mut path = if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    };
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    while path.contains("//") {
        path = path.replace("//", "/");
    }
    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    path
}

/// Component safe set: encode everything except unreserved characters, so an
/// encoded component can be embedded in a path segment or query value.
const COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'/')
    .add(b':')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b']');

/// Percent-encode a string for use as a single URI component.
pub fn encode_component(component: &str) -> String {
    utf8_percent_encode(component, COMPONENT).to_string()
}

/// Decode a percent-encoded component back to text.
pub fn decode_component(encoded: &str) -> String {
    percent_decode_str(encoded).decode_utf8_lossy().into_owned()
}
