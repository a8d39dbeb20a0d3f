/*
 * response.rs
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

use super::{
    find_crlf, parse_header_block, serialize_header_block, HttpError, HttpErrorKind, HttpHeaders,
    HttpOp, HttpVersion, StatusCode,
};

const OP_PARSE: HttpOp = HttpOp::ResponseParsing;
const OP_SERIALIZE: HttpOp = HttpOp::ResponseSerialization;

/// An HTTP response message. An HTTP/0.9 response is a bare payload
/// with an implied 200 status and no headers.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub version: HttpVersion,
    pub status: StatusCode,
    pub headers: HttpHeaders,
    pub payload: Vec<u8>,
}

impl HttpResponse {
    pub fn new(version: HttpVersion, status: StatusCode) -> HttpResponse {
        HttpResponse {
            version,
            status,
            headers: HttpHeaders::new(),
            payload: Vec::new(),
        }
    }

    /// Parse `data` as a response in the given version's wire format.
    pub fn parse(data: &[u8], version: HttpVersion) -> Result<HttpResponse, HttpError> {
        match version {
            HttpVersion::Http09 => {
                let mut response = HttpResponse::new(HttpVersion::Http09, StatusCode::OK);
                response.payload = data.to_vec();
                Ok(response)
            }
            HttpVersion::Http10 | HttpVersion::Http11 => Self::parse_1_x(data, version),
            _ => Err(HttpError::with_detail(
                OP_PARSE,
                HttpErrorKind::InvalidHttpVersion,
                version.as_str(),
            )),
        }
    }

    fn parse_1_x(data: &[u8], version: HttpVersion) -> Result<HttpResponse, HttpError> {
        let eol = find_crlf(data).ok_or_else(|| HttpError::new(OP_PARSE, HttpErrorKind::Generic))?;
        let line = std::str::from_utf8(&data[..eol])
            .map_err(|_| HttpError::new(OP_PARSE, HttpErrorKind::Generic))?;

        // "HTTP/x.y CODE reason"; the reason phrase is informational and
        // may contain spaces, so only the first two tokens matter.
        let mut tokens = line.splitn(3, ' ');
        let version_token = tokens
            .next()
            .ok_or_else(|| HttpError::new(OP_PARSE, HttpErrorKind::Generic))?;
        let code_token = tokens
            .next()
            .ok_or_else(|| HttpError::new(OP_PARSE, HttpErrorKind::Generic))?;

        if version_token != version.as_str() {
            return Err(HttpError::with_detail(
                OP_PARSE,
                HttpErrorKind::InvalidHttpVersion,
                version_token,
            ));
        }

        if code_token.is_empty() || !code_token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HttpError::with_detail(
                OP_PARSE,
                HttpErrorKind::InvalidStatusCode,
                code_token,
            ));
        }
        let code: u16 = code_token.parse().map_err(|_| {
            HttpError::with_detail(OP_PARSE, HttpErrorKind::InvalidStatusCode, code_token)
        })?;
        let status = StatusCode::from_code(code).ok_or_else(|| {
            HttpError::with_detail(OP_PARSE, HttpErrorKind::InvalidStatusCode, code_token)
        })?;

        let (headers, payload) = parse_header_block(&data[eol + 2..], OP_PARSE)?;
        Ok(HttpResponse {
            version,
            status,
            headers,
            payload,
        })
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

    // HTTP/0.9 can only express a successful, headerless response.
    fn serialize_0_9(&self) -> Result<Vec<u8>, HttpError> {
        if self.status != StatusCode::OK {
            return Err(HttpError::new(OP_SERIALIZE, HttpErrorKind::InvalidStatusCode));
        }
        if !self.headers.is_empty() {
            return Err(HttpError::new(OP_SERIALIZE, HttpErrorKind::Generic));
        }
        Ok(self.payload.clone())
    }

    fn serialize_1_x(&self) -> Result<Vec<u8>, HttpError> {
        let reason = self.status.reason().ok_or_else(|| {
            HttpError::with_detail(
                OP_SERIALIZE,
                HttpErrorKind::InvalidStatusCode,
                self.status.code().to_string(),
            )
        })?;

        let mut out = Vec::new();
        out.extend_from_slice(self.version.as_str().as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.status.code().to_string().as_bytes());
        out.push(b' ');
        out.extend_from_slice(reason.as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&serialize_header_block(&self.headers, OP_SERIALIZE)?);
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.payload);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_response() {
        let data = b"HTTP/1.1 200 OK\r\ncontent-type: text/html\r\n\r\n<html/>";
        let res = HttpResponse::parse(data, HttpVersion::Http11).unwrap();
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.headers.get("content-type"), Some("text/html"));
        assert_eq!(res.payload, b"<html/>");
    }

    #[test]
    fn reason_phrase_is_ignored_on_parse() {
        let data = b"HTTP/1.1 404 Whatever You Like\r\n\r\n";
        let res = HttpResponse::parse(data, HttpVersion::Http11).unwrap();
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn rejects_non_numeric_status() {
        let data = b"HTTP/1.1 2OO OK\r\n\r\n";
        let err = HttpResponse::parse(data, HttpVersion::Http11).unwrap_err();
        assert_eq!(err.kind(), HttpErrorKind::InvalidStatusCode);
        assert_eq!(err.op(), HttpOp::ResponseParsing);
    }

    #[test]
    fn rejects_unregistered_status() {
        let data = b"HTTP/1.1 299 Custom\r\n\r\n";
        let err = HttpResponse::parse(data, HttpVersion::Http11).unwrap_err();
        assert_eq!(err.kind(), HttpErrorKind::InvalidStatusCode);
    }

    #[test]
    fn rejects_version_mismatch() {
        let data = b"HTTP/1.0 200 OK\r\n\r\n";
        let err = HttpResponse::parse(data, HttpVersion::Http11).unwrap_err();
        assert_eq!(err.kind(), HttpErrorKind::InvalidHttpVersion);
    }

    #[test]
    fn parse_0_9_is_the_payload() {
        let res = HttpResponse::parse(b"<html>hi</html>", HttpVersion::Http09).unwrap();
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.headers.is_empty());
        assert_eq!(res.payload, b"<html>hi</html>");
    }

    #[test]
    fn serialize_0_9_guards() {
        let mut res = HttpResponse::new(HttpVersion::Http09, StatusCode::OK);
        res.payload = b"hello".to_vec();
        assert_eq!(res.serialize().unwrap(), b"hello");

        res.status = StatusCode::NOT_FOUND;
        assert!(res.serialize().is_err());

        res.status = StatusCode::OK;
        res.headers.add("content-type", "text/plain").unwrap();
        assert!(res.serialize().is_err());
    }

    #[test]
    fn serializes_status_line_and_sorted_headers() {
        let mut res = HttpResponse::new(HttpVersion::Http11, StatusCode::NOT_FOUND);
        res.headers.add("server", "vnet").unwrap();
        res.headers.add("content-length", "0").unwrap();
        let bytes = res.serialize().unwrap();
        assert_eq!(
            bytes,
            b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nserver: vnet\r\n\r\n"
        );
    }

    #[test]
    fn round_trips() {
        let data: &[u8] = b"HTTP/1.0 200 OK\r\ncontent-type: text/plain\r\n\r\nbody";
        let res = HttpResponse::parse(data, HttpVersion::Http10).unwrap();
        assert_eq!(res.serialize().unwrap(), data);
    }
}
