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

/// The operation during which an HTTP codec error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpOp {
    RequestParsing,
    RequestSerialization,
    ResponseParsing,
    ResponseSerialization,
}

impl HttpOp {
    fn as_str(&self) -> &'static str {
        match self {
            HttpOp::RequestParsing => "HTTP request parsing error",
            HttpOp::RequestSerialization => "HTTP request serialization error",
            HttpOp::ResponseParsing => "HTTP response parsing error",
            HttpOp::ResponseSerialization => "HTTP response serialization error",
        }
    }
}

/// What went wrong, independently of the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    Generic,
    InvalidStatusCode,
    InvalidHeaderName,
    InvalidHeaderValue,
    InvalidHttpVersion,
    InvalidMethod,
    InvalidRequestUri,
}

impl HttpErrorKind {
    fn as_str(&self) -> &'static str {
        match self {
            HttpErrorKind::Generic => "malformed message",
            HttpErrorKind::InvalidStatusCode => "invalid status code",
            HttpErrorKind::InvalidHeaderName => "invalid header name",
            HttpErrorKind::InvalidHeaderValue => "invalid header value",
            HttpErrorKind::InvalidHttpVersion => "invalid HTTP version",
            HttpErrorKind::InvalidMethod => "invalid method",
            HttpErrorKind::InvalidRequestUri => "invalid request URI",
        }
    }
}

/// Error raised by the request and response codecs. Carries both the
/// operation that failed and the kind of failure, plus optional detail
/// text quoting the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    op: HttpOp,
    kind: HttpErrorKind,
    detail: Option<String>,
}

impl HttpError {
    pub fn new(op: HttpOp, kind: HttpErrorKind) -> HttpError {
        HttpError {
            op,
            kind,
            detail: None,
        }
    }

    pub fn with_detail(op: HttpOp, kind: HttpErrorKind, detail: impl Into<String>) -> HttpError {
        HttpError {
            op,
            kind,
            detail: Some(detail.into()),
        }
    }

    pub fn op(&self) -> HttpOp {
        self.op
    }

    pub fn kind(&self) -> HttpErrorKind {
        self.kind
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.op.as_str(), self.kind.as_str())?;
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl Error for HttpError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_without_detail() {
        let e = HttpError::new(HttpOp::RequestParsing, HttpErrorKind::InvalidMethod);
        assert_eq!(e.to_string(), "HTTP request parsing error: invalid method");
    }

    #[test]
    fn display_with_detail() {
        let e = HttpError::with_detail(
            HttpOp::ResponseSerialization,
            HttpErrorKind::InvalidHeaderValue,
            "x-test",
        );
        assert_eq!(
            e.to_string(),
            "HTTP response serialization error: invalid header value: x-test"
        );
    }
}
