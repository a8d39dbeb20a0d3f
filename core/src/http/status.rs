/*
 * status.rs
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

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};

use super::RegistryError;

/// A response status code paired with its reason phrase through the
/// registry. The IANA codes are built in; applications may register
/// additional codes at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

// https://developer.mozilla.org/en-US/docs/Web/HTTP/Status
const BUILTIN_STATUS_CODES: &[(u16, &str)] = &[
    (100, "Continue"),
    (101, "Switching Protocols"),
    (102, "Processing"),
    (103, "Early Hints"),
    (200, "OK"),
    (201, "Created"),
    (202, "Accepted"),
    (203, "Non-Authoritative Information"),
    (204, "No Content"),
    (205, "Reset Content"),
    (206, "Partial Content"),
    (207, "Multi-Status"),
    (208, "Already Reported"),
    (226, "IM Used"),
    (300, "Multiple Choices"),
    (301, "Moved Permanently"),
    (302, "Found"),
    (303, "See Other"),
    (304, "Not Modified"),
    (305, "Use Proxy"),
    (307, "Temporary Redirect"),
    (308, "Permanent Redirect"),
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (402, "Payment Required"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (406, "Not Acceptable"),
    (407, "Proxy Authentication Required"),
    (408, "Request Timeout"),
    (409, "Conflict"),
    (410, "Gone"),
    (411, "Length Required"),
    (412, "Precondition Failed"),
    (413, "Payload Too Large"),
    (414, "URI Too Long"),
    (415, "Unsupported Media Type"),
    (416, "Range Not Satisfiable"),
    (417, "Expectation Failed"),
    (418, "I'm a teapot"),
    (421, "Misdirected Request"),
    (422, "Unprocessable Content"),
    (423, "Locked"),
    (424, "Failed Dependency"),
    (425, "Too Early"),
    (426, "Upgrade Required"),
    (428, "Precondition Required"),
    (429, "Too Many Requests"),
    (431, "Request Header Fields Too Large"),
    (451, "Unavailable For Legal Reasons"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
    (505, "HTTP Version Not Supported"),
    (506, "Variant Also Negotiates"),
    (507, "Insufficient Storage"),
    (508, "Loop Detected"),
    (510, "Not Extended"),
    (511, "Network Authentication Required"),
];

fn custom_status_codes() -> &'static Mutex<HashMap<u16, String>> {
    static CUSTOM: OnceLock<Mutex<HashMap<u16, String>>> = OnceLock::new();
    CUSTOM.get_or_init(|| Mutex::new(HashMap::new()))
}

fn builtin_reason(code: u16) -> Option<&'static str> {
    BUILTIN_STATUS_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, reason)| *reason)
}

impl StatusCode {
    pub const CONTINUE: StatusCode = StatusCode(100);
    pub const SWITCHING_PROTOCOLS: StatusCode = StatusCode(101);
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const ACCEPTED: StatusCode = StatusCode(202);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const MOVED_PERMANENTLY: StatusCode = StatusCode(301);
    pub const FOUND: StatusCode = StatusCode(302);
    pub const NOT_MODIFIED: StatusCode = StatusCode(304);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    pub const FORBIDDEN: StatusCode = StatusCode(403);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    pub const REQUEST_TIMEOUT: StatusCode = StatusCode(408);
    pub const IM_A_TEAPOT: StatusCode = StatusCode(418);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const NOT_IMPLEMENTED: StatusCode = StatusCode(501);
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode(503);

    pub fn code(&self) -> u16 {
        self.0
    }

    /// Reason phrase bound to this code, or None if the code is not
    /// registered.
    pub fn reason(&self) -> Option<String> {
        if let Some(reason) = builtin_reason(self.0) {
            return Some(reason.to_string());
        }
        custom_status_codes().lock().unwrap().get(&self.0).cloned()
    }

    /// A registered status code with this numeric value.
    pub fn from_code(code: u16) -> Option<StatusCode> {
        if builtin_reason(code).is_some() {
            return Some(StatusCode(code));
        }
        if custom_status_codes().lock().unwrap().contains_key(&code) {
            return Some(StatusCode(code));
        }
        None
    }

    /// The status code whose reason phrase matches exactly.
    pub fn from_reason(reason: &str) -> Option<StatusCode> {
        if let Some((code, _)) = BUILTIN_STATUS_CODES.iter().find(|(_, r)| *r == reason) {
            return Some(StatusCode(*code));
        }
        custom_status_codes()
            .lock()
            .unwrap()
            .iter()
            .find(|(_, r)| r.as_str() == reason)
            .map(|(code, _)| StatusCode(*code))
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{} {}", self.0, reason),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Register a custom status code. Built-in codes cannot be rebound and
/// registering the same code twice is refused.
pub fn register_status_code(code: u16, reason: &str) -> Result<StatusCode, RegistryError> {
    if builtin_reason(code).is_some() {
        return Err(RegistryError::CannotReregister);
    }
    let mut customs = custom_status_codes().lock().unwrap();
    if customs.contains_key(&code) {
        return Err(RegistryError::AlreadyRegistered);
    }
    customs.insert(code, reason.to_string());
    Ok(StatusCode(code))
}

/// Remove a custom status code. Built-in codes cannot be removed.
pub fn unregister_status_code(status: StatusCode) -> Result<(), RegistryError> {
    if builtin_reason(status.0).is_some() {
        return Err(RegistryError::CannotUnregister);
    }
    let mut customs = custom_status_codes().lock().unwrap();
    if customs.remove(&status.0).is_none() {
        return Err(RegistryError::DoesNotExist);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_reasons() {
        assert_eq!(StatusCode::OK.reason().as_deref(), Some("OK"));
        assert_eq!(StatusCode::IM_A_TEAPOT.reason().as_deref(), Some("I'm a teapot"));
        assert_eq!(
            StatusCode::from_code(511).and_then(|s| s.reason()).as_deref(),
            Some("Network Authentication Required")
        );
        assert_eq!(StatusCode::from_code(299), None);
    }

    #[test]
    fn lookup_by_reason() {
        assert_eq!(StatusCode::from_reason("Not Found"), Some(StatusCode::NOT_FOUND));
        assert_eq!(StatusCode::from_reason("not found"), None);
    }

    #[test]
    fn display_includes_reason() {
        assert_eq!(StatusCode::BAD_REQUEST.to_string(), "400 Bad Request");
    }

    #[test]
    fn custom_status_lifecycle() {
        let s = register_status_code(799, "Reserved For Testing").unwrap();
        assert_eq!(s.reason().as_deref(), Some("Reserved For Testing"));
        assert_eq!(StatusCode::from_code(799), Some(s));
        assert_eq!(
            register_status_code(799, "Again"),
            Err(RegistryError::AlreadyRegistered)
        );
        unregister_status_code(s).unwrap();
        assert_eq!(s.reason(), None);
        assert_eq!(unregister_status_code(s), Err(RegistryError::DoesNotExist));
    }

    #[test]
    fn builtins_are_protected() {
        assert_eq!(
            register_status_code(200, "Okay"),
            Err(RegistryError::CannotReregister)
        );
        assert_eq!(
            unregister_status_code(StatusCode::OK),
            Err(RegistryError::CannotUnregister)
        );
    }
}
