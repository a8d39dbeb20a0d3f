/*
 * error.rs
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

use std::error::Error;
use std::fmt;
use std::io;

/// Error raised by the TLS layer. I/O failures carry the OS error code;
/// failures originating in this library use the negative codes below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityError {
    code: i32,
    message: String,
}

impl SecurityError {
    /// TLS protocol failure reported by the session.
    pub const CODE_TLS: i32 = -1;
    /// The handshake token buffer could not be allocated.
    pub const CODE_OUT_OF_MEMORY: i32 = -2;
    /// Plaintext longer than a single TLS record allows.
    pub const CODE_MESSAGE_TOO_LONG: i32 = -3;
    /// The context's role does not permit the requested operation.
    pub const CODE_INVALID_ROLE: i32 = -4;
    /// The peer closed the connection mid-operation.
    pub const CODE_CONNECTION_CLOSED: i32 = -5;
    /// The certificate or protocol configuration is unusable.
    pub const CODE_BAD_CONFIGURATION: i32 = -6;

    pub fn new(code: i32, message: impl Into<String>) -> SecurityError {
        SecurityError {
            code,
            message: message.into(),
        }
    }

    pub fn from_io(err: &io::Error) -> SecurityError {
        SecurityError {
            code: err.raw_os_error().unwrap_or(Self::CODE_CONNECTION_CLOSED),
            message: err.to_string(),
        }
    }

    pub fn from_tls(err: &rustls::Error) -> SecurityError {
        SecurityError {
            code: Self::CODE_TLS,
            message: err.to_string(),
        }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SecurityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "security error {}: {}", self.code, self.message)
    }
}

impl Error for SecurityError {}
