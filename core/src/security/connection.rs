/*
 * connection.rs
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

use std::fmt;
use std::io::{ErrorKind, Read, Write};

use bytes::{BufMut, BytesMut};

use super::{Certificate, SecurityError};

/// TLS record header length.
pub const TLS_RECORD_HEADER_LEN: usize = 5;
/// Worst-case per-record overhead after the header (MAC, padding, tag).
pub const TLS_RECORD_TRAILER_LEN: usize = 256;
/// Largest TLS record this layer will produce or accept.
pub const TLS_MAX_FRAGMENT_LEN: usize = 16384;

/// Record-layer framing limits for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSizes {
    pub header: usize,
    pub trailer: usize,
    pub max_message: usize,
}

impl StreamSizes {
    /// Largest plaintext that fits in a single record.
    pub fn max_chunk(&self) -> usize {
        self.max_message - self.header - self.trailer
    }
}

/// An established TLS session. Encrypt turns plaintext into wire
/// records; decrypt turns complete wire records back into plaintext.
/// The caller moves the bytes; this type never touches a socket.
pub struct SecureConnection {
    session: rustls::Connection,
    local_certificate: Option<Certificate>,
}

impl SecureConnection {
    pub(crate) fn new(
        session: rustls::Connection,
        local_certificate: Option<Certificate>,
    ) -> SecureConnection {
        SecureConnection {
            session,
            local_certificate,
        }
    }

    pub fn stream_sizes(&self) -> StreamSizes {
        StreamSizes {
            header: TLS_RECORD_HEADER_LEN,
            trailer: TLS_RECORD_TRAILER_LEN,
            max_message: TLS_MAX_FRAGMENT_LEN,
        }
    }

    /// Encrypt a single record. Plaintext longer than
    /// [`StreamSizes::max_chunk`] is refused; use
    /// [`encrypt_large_message`](Self::encrypt_large_message) for that.
    pub fn encrypt(&mut self, data: &[u8]) -> Result<Vec<u8>, SecurityError> {
        let sizes = self.stream_sizes();
        if data.len() > sizes.max_chunk() {
            return Err(SecurityError::new(
                SecurityError::CODE_MESSAGE_TOO_LONG,
                format!(
                    "message of {} bytes exceeds the {} byte record limit",
                    data.len(),
                    sizes.max_chunk()
                ),
            ));
        }
        self.encrypt_chunk(data)
    }

    /// Encrypt arbitrarily long plaintext as a sequence of records,
    /// concatenated in order.
    pub fn encrypt_large_message(&mut self, data: &[u8]) -> Result<Vec<u8>, SecurityError> {
        let max_chunk = self.stream_sizes().max_chunk();
        let mut out = Vec::new();
        for chunk in data.chunks(max_chunk.max(1)) {
            out.extend_from_slice(&self.encrypt_chunk(chunk)?);
        }
        Ok(out)
    }

    fn encrypt_chunk(&mut self, chunk: &[u8]) -> Result<Vec<u8>, SecurityError> {
        self.session
            .writer()
            .write_all(chunk)
            .map_err(|e| SecurityError::from_io(&e))?;
        let mut wire = BytesMut::new().writer();
        while self.session.wants_write() {
            self.session
                .write_tls(&mut wire)
                .map_err(|e| SecurityError::from_io(&e))?;
        }
        Ok(wire.into_inner().to_vec())
    }

    /// Decrypt complete wire records into plaintext. The input must not
    /// exceed the session's maximum message size.
    pub fn decrypt(&mut self, data: &[u8]) -> Result<Vec<u8>, SecurityError> {
        let sizes = self.stream_sizes();
        if data.len() > sizes.max_message {
            return Err(SecurityError::new(
                SecurityError::CODE_MESSAGE_TOO_LONG,
                format!(
                    "ciphertext of {} bytes exceeds the session maximum",
                    data.len()
                ),
            ));
        }

        let mut rd = data;
        while !rd.is_empty() {
            self.session
                .read_tls(&mut rd)
                .map_err(|e| SecurityError::from_io(&e))?;
            self.session
                .process_new_packets()
                .map_err(|e| SecurityError::from_tls(&e))?;
        }

        let mut plaintext = BytesMut::new();
        let mut buf = [0u8; 4096];
        loop {
            match self.session.reader().read(&mut buf) {
                Ok(0) => break,
                Ok(n) => plaintext.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(SecurityError::from_io(&e)),
            }
        }
        Ok(plaintext.to_vec())
    }

    /// The certificate this side presented, if any.
    pub fn certificate(&self) -> Option<&Certificate> {
        self.local_certificate.as_ref()
    }

    /// The certificate the peer presented during the handshake, if any.
    /// Absence is a normal condition, not an error.
    pub fn peer_certificate(&self) -> Option<Certificate> {
        self.session
            .peer_certificates()
            .and_then(|chain| chain.first())
            .map(|der| Certificate::from_der(der.as_ref().to_vec()))
    }
}

impl fmt::Debug for SecureConnection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SecureConnection")
            .field("local_certificate", &self.local_certificate)
            .field("has_peer_certificate", &self.peer_certificate().is_some())
            .finish()
    }
}
