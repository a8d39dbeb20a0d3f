/*
 * request.rs
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

use crate::uri::Uri;

use super::{
    find_crlf, parse_header_block, serialize_header_block, HttpError, HttpErrorKind, HttpHeaders,
    HttpOp, HttpVersion, Method,
};

const OP_PARSE: HttpOp = HttpOp::RequestParsing;
const OP_SERIALIZE: HttpOp = HttpOp::RequestSerialization;

/// An HTTP request message. The codec covers HTTP/0.9, 1.0 and 1.1;
/// requests labelled 2.0 or 3.0 can be modelled but not put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub version: HttpVersion,
    pub method: Method,
    pub uri: Uri,
    pub headers: HttpHeaders,
    pub payload: Vec<u8>,
}

impl HttpRequest {
    pub fn new(version: HttpVersion, method: Method, uri: Uri) -> HttpRequest {
        HttpRequest {
            version,
            method,
            uri,
            headers: HttpHeaders::new(),
            payload: Vec::new(),
        }
    }

    /// Parse `data` as a request in the given version's wire format.
    pub fn parse(data: &[u8], version: HttpVersion) -> Result<HttpRequest, HttpError> {
        match version {
            HttpVersion::Http09 => Self::parse_0_9(data),
            HttpVersion::Http10 | HttpVersion::Http11 => Self::parse_1_x(data, version),
            _ => Err(HttpError::with_detail(
                OP_PARSE,
                HttpErrorKind::InvalidHttpVersion,
                version.as_str(),
            )),
        }
    }

    // HTTP/0.9: a single "GET <target>" line, nothing after it.
    fn parse_0_9(data: &[u8]) -> Result<HttpRequest, HttpError> {
        let eol = find_crlf(data).ok_or_else(|| HttpError::new(OP_PARSE, HttpErrorKind::Generic))?;
        if eol + 2 != data.len() {
            return Err(HttpError::new(OP_PARSE, HttpErrorKind::Generic));
        }
        let line = std::str::from_utf8(&data[..eol])
            .map_err(|_| HttpError::new(OP_PARSE, HttpErrorKind::Generic))?;
        let mut tokens = line.split(' ');
        let method = tokens
            .next()
            .ok_or_else(|| HttpError::new(OP_PARSE, HttpErrorKind::Generic))?;
        let target = tokens
            .next()
            .ok_or_else(|| HttpError::new(OP_PARSE, HttpErrorKind::Generic))?;
        if tokens.next().is_some() {
            return Err(HttpError::new(OP_PARSE, HttpErrorKind::Generic));
        }
        if method != "GET" {
            return Err(HttpError::with_detail(OP_PARSE, HttpErrorKind::InvalidMethod, method));
        }
        let uri = Self::parse_target(target)?;
        Ok(HttpRequest::new(HttpVersion::Http09, Method::GET, uri))
    }

    fn parse_1_x(data: &[u8], version: HttpVersion) -> Result<HttpRequest, HttpError> {
        let eol = find_crlf(data).ok_or_else(|| HttpError::new(OP_PARSE, HttpErrorKind::Generic))?;
        let line = std::str::from_utf8(&data[..eol])
            .map_err(|_| HttpError::new(OP_PARSE, HttpErrorKind::Generic))?;

        let mut tokens = line.split(' ');
        let (method_token, target, version_token) = match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
            (Some(m), Some(t), Some(v), None) => (m, t, v),
            _ => return Err(HttpError::new(OP_PARSE, HttpErrorKind::Generic)),
        };

        let method = Method::from_token(method_token).ok_or_else(|| {
            HttpError::with_detail(OP_PARSE, HttpErrorKind::InvalidMethod, method_token)
        })?;
        check_method_for_version(method, version, OP_PARSE)?;

        let uri = Self::parse_target(target)?;

        if version_token != version.as_str() {
            return Err(HttpError::with_detail(
                OP_PARSE,
                HttpErrorKind::InvalidHttpVersion,
                version_token,
            ));
        }

        let (headers, payload) = parse_header_block(&data[eol + 2..], OP_PARSE)?;
        Ok(HttpRequest {
            version,
            method,
            uri,
            headers,
            payload,
        })
    }

    // Only origin-form targets are accepted.
    fn parse_target(target: &str) -> Result<Uri, HttpError> {
        if !target.starts_with('/') {
            return Err(HttpError::with_detail(
                OP_PARSE,
                HttpErrorKind::InvalidRequestUri,
                target,
            ));
        }
        Uri::parse(target)
            .map_err(|e| HttpError::with_detail(OP_PARSE, HttpErrorKind::InvalidRequestUri, e.to_string()))
    }

    /// Serialize in the message's own version's wire format.
    pub fn serialize(&self) -> Result<Vec<u8>, HttpError> {
        match self.version {
            HttpVersion::Http09 => self.serialize_0_9(),
            HttpVersion::Http10 | HttpVersion::Http11 => self.serialize_1_x(),
            _ => Err(HttpError::with_detail(
                OP_SERIALIZE,
                HttpErrorKind::InvalidHttpVersion,
                self.version.as_str(),
            )),
        }
    }

    fn serialize_0_9(&self) -> Result<Vec<u8>, HttpError> {
        if self.method != Method::GET {
            return Err(HttpError::new(OP_SERIALIZE, HttpErrorKind::InvalidMethod));
        }
        if !self.headers.is_empty() {
            return Err(HttpError::new(OP_SERIALIZE, HttpErrorKind::Generic));
        }
        let mut out = Vec::new();
        out.extend_from_slice(b"GET ");
        out.extend_from_slice(self.target().as_bytes());
        out.extend_from_slice(b"\r\n");
        Ok(out)
    }

    fn serialize_1_x(&self) -> Result<Vec<u8>, HttpError> {
        let method_token = self.method.as_token().ok_or_else(|| {
            HttpError::new(OP_SERIALIZE, HttpErrorKind::InvalidMethod)
        })?;
        check_method_for_version(self.method, self.version, OP_SERIALIZE)?;

        let mut out = Vec::new();
        out.extend_from_slice(method_token.as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.target().as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.version.as_str().as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&serialize_header_block(&self.headers, OP_SERIALIZE)?);
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    fn target(&self) -> String {
        let mut target = self.uri.path().unwrap_or("/").to_string();
        if let Some(query) = self.uri.query() {
            target.push('?');
            target.push_str(query);
        }
        target
    }
}

// HTTP/1.0 knows only GET, HEAD and POST.
fn check_method_for_version(method: Method, version: HttpVersion, op: HttpOp) -> Result<(), HttpError> {
    if version == HttpVersion::Http10
        && !matches!(method, Method::GET | Method::HEAD | Method::POST)
    {
        let token = method.as_token().unwrap_or_default();
        return Err(HttpError::with_detail(
            op,
            HttpErrorKind::InvalidMethod,
            format!("{} is not valid in HTTP/1.0", token),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_get() {
        let data = b"GET /index.html HTTP/1.1\r\nhost: example.com\r\n\r\n";
        let req = HttpRequest::parse(data, HttpVersion::Http11).unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.uri.path(), Some("/index.html"));
        assert_eq!(req.headers.get("host"), Some("example.com"));
        assert!(req.payload.is_empty());
    }

    #[test]
    fn parses_request_without_headers() {
        let data = b"GET / HTTP/1.1\r\n";
        let req = HttpRequest::parse(data, HttpVersion::Http11).unwrap();
        assert!(req.headers.is_empty());
        assert!(req.payload.is_empty());
    }

    #[test]
    fn parses_payload_verbatim() {
        let data = b"POST /submit HTTP/1.1\r\ncontent-length: 5\r\n\r\nhello";
        let req = HttpRequest::parse(data, HttpVersion::Http11).unwrap();
        assert_eq!(req.payload, b"hello");
    }

    #[test]
    fn rejects_unknown_method() {
        let data = b"FROB / HTTP/1.1\r\n\r\n";
        let err = HttpRequest::parse(data, HttpVersion::Http11).unwrap_err();
        assert_eq!(err.kind(), HttpErrorKind::InvalidMethod);
        assert_eq!(err.op(), HttpOp::RequestParsing);
    }

    #[test]
    fn http_1_0_rejects_extension_methods() {
        let data = b"PATCH /x HTTP/1.0\r\n\r\n";
        let err = HttpRequest::parse(data, HttpVersion::Http10).unwrap_err();
        assert_eq!(err.kind(), HttpErrorKind::InvalidMethod);

        let data = b"POST /x HTTP/1.0\r\n\r\n";
        assert!(HttpRequest::parse(data, HttpVersion::Http10).is_ok());
    }

    #[test]
    fn rejects_version_mismatch() {
        let data = b"GET / HTTP/1.0\r\n\r\n";
        let err = HttpRequest::parse(data, HttpVersion::Http11).unwrap_err();
        assert_eq!(err.kind(), HttpErrorKind::InvalidHttpVersion);
    }

    #[test]
    fn rejects_non_origin_form_target() {
        let data = b"GET http://example.com/ HTTP/1.1\r\n\r\n";
        let err = HttpRequest::parse(data, HttpVersion::Http11).unwrap_err();
        assert_eq!(err.kind(), HttpErrorKind::InvalidRequestUri);
    }

    #[test]
    fn rejects_missing_crlf() {
        let err = HttpRequest::parse(b"GET / HTTP/1.1", HttpVersion::Http11).unwrap_err();
        assert_eq!(err.kind(), HttpErrorKind::Generic);
    }

    #[test]
    fn parse_0_9_is_get_only() {
        let req = HttpRequest::parse(b"GET /doc.txt\r\n", HttpVersion::Http09).unwrap();
        assert_eq!(req.version, HttpVersion::Http09);
        assert_eq!(req.uri.path(), Some("/doc.txt"));

        let err = HttpRequest::parse(b"POST /doc.txt\r\n", HttpVersion::Http09).unwrap_err();
        assert_eq!(err.kind(), HttpErrorKind::InvalidMethod);
    }

    #[test]
    fn parse_0_9_rejects_trailing_bytes() {
        let err = HttpRequest::parse(b"GET /doc.txt\r\nextra", HttpVersion::Http09).unwrap_err();
        assert_eq!(err.kind(), HttpErrorKind::Generic);
    }

    #[test]
    fn serializes_with_sorted_headers() {
        let uri = Uri::parse("/a?b=1").unwrap();
        let mut req = HttpRequest::new(HttpVersion::Http11, Method::GET, uri);
        req.headers.add("host", "example.com").unwrap();
        req.headers.add("accept", "text/html").unwrap();
        let bytes = req.serialize().unwrap();
        assert_eq!(
            bytes,
            b"GET /a?b=1 HTTP/1.1\r\naccept: text/html\r\nhost: example.com\r\n\r\n"
        );
    }

    #[test]
    fn serialize_0_9_rejects_headers() {
        let uri = Uri::parse("/").unwrap();
        let mut req = HttpRequest::new(HttpVersion::Http09, Method::GET, uri);
        req.headers.add("host", "example.com").unwrap();
        assert!(req.serialize().is_err());
        req.headers.clear();
        assert_eq!(req.serialize().unwrap(), b"GET /\r\n");
    }

    #[test]
    fn serialize_detects_invalid_raw_header() {
        let uri = Uri::parse("/").unwrap();
        let mut req = HttpRequest::new(HttpVersion::Http11, Method::GET, uri);
        req.headers.append_raw("bad name", "x");
        let err = req.serialize().unwrap_err();
        assert_eq!(err.kind(), HttpErrorKind::InvalidHeaderName);
        assert_eq!(err.op(), HttpOp::RequestSerialization);
    }

    #[test]
    fn round_trips() {
        let data: &[u8] = b"POST /form HTTP/1.1\r\ncontent-type: text/plain\r\nhost: example.com\r\n\r\nname=value";
        let req = HttpRequest::parse(data, HttpVersion::Http11).unwrap();
        assert_eq!(req.serialize().unwrap(), data);
    }
}
