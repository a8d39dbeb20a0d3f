/*
 * context.rs
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
use std::io::{Read, Write};
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use log::debug;
use rustls::server::WebPkiClientVerifier;
use rustls::{ClientConfig, RootCertStore, ServerConfig, ServerConnection, SupportedProtocolVersion};

use super::{Certificate, SecureConnection, SecurityError};

/// Input token buffer size for each handshake iteration.
pub const HANDSHAKE_BUFFER_LEN: usize = 16384;

/// Protocol selection bitset. Only TLS 1.2 and TLS 1.3 can actually be
/// negotiated; the legacy bits exist so a configuration naming them is
/// rejected explicitly rather than silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityProtocol(u16);

impl SecurityProtocol {
    pub const SSL_2_0: SecurityProtocol = SecurityProtocol(1);
    pub const SSL_3_0: SecurityProtocol = SecurityProtocol(2);
    pub const TLS_1_0: SecurityProtocol = SecurityProtocol(4);
    pub const TLS_1_1: SecurityProtocol = SecurityProtocol(8);
    pub const TLS_1_2: SecurityProtocol = SecurityProtocol(16);
    pub const TLS_1_3: SecurityProtocol = SecurityProtocol(32);

    pub fn contains(&self, other: SecurityProtocol) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SecurityProtocol {
    type Output = SecurityProtocol;

    fn bitor(self, rhs: SecurityProtocol) -> SecurityProtocol {
        SecurityProtocol(self.0 | rhs.0)
    }
}

impl BitOrAssign for SecurityProtocol {
    fn bitor_assign(&mut self, rhs: SecurityProtocol) {
        self.0 |= rhs.0;
    }
}

/// Whether the context holds server or client credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationRole {
    Server,
    Client,
}

/// Options for `accept_connection_with_flags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptConnectionFlags(u32);

impl AcceptConnectionFlags {
    pub const NONE: AcceptConnectionFlags = AcceptConnectionFlags(0);
    /// Require and verify a client certificate during the handshake.
    pub const MUTUAL_AUTHENTICATION: AcceptConnectionFlags = AcceptConnectionFlags(1);

    pub fn contains(&self, other: AcceptConnectionFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for AcceptConnectionFlags {
    type Output = AcceptConnectionFlags;

    fn bitor(self, rhs: AcceptConnectionFlags) -> AcceptConnectionFlags {
        AcceptConnectionFlags(self.0 | rhs.0)
    }
}

/// Outcome of one handshake iteration. The token, when non-empty, must
/// be sent to the peer before the next iteration.
#[derive(Debug)]
pub(crate) enum HandshakeStatus {
    Continue { token: Vec<u8> },
    Complete { token: Vec<u8> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandshakeState {
    Handshaking,
    Complete,
    Failed,
}

enum Credentials {
    Server(Arc<ServerConfig>),
    Client(Arc<ClientConfig>),
}

/// Loaded TLS credentials bound to a role and a protocol selection.
/// A server context drives handshakes over blocking streams and turns
/// them into [`SecureConnection`]s.
pub struct SecurityContext {
    role: ApplicationRole,
    protocols: SecurityProtocol,
    certificate: Option<Certificate>,
    credentials: Credentials,
}

impl SecurityContext {
    /// Build a context. A server context needs a certificate with its
    /// private key; a client context may omit the certificate, or carry
    /// one with a key for mutual authentication.
    pub fn new(
        certificate: Option<Certificate>,
        protocols: SecurityProtocol,
        role: ApplicationRole,
    ) -> Result<SecurityContext, SecurityError> {
        let versions = protocol_versions(protocols)?;
        let credentials = match role {
            ApplicationRole::Server => {
                let certificate = certificate.as_ref().ok_or_else(|| {
                    SecurityError::new(
                        SecurityError::CODE_BAD_CONFIGURATION,
                        "server context requires a certificate",
                    )
                })?;
                let key = certificate.key().ok_or_else(|| {
                    SecurityError::new(
                        SecurityError::CODE_BAD_CONFIGURATION,
                        "server certificate has no private key",
                    )
                })?;
                let config = ServerConfig::builder_with_protocol_versions(&versions)
                    .with_no_client_auth()
                    .with_single_cert(certificate.chain().to_vec(), key)
                    .map_err(|e| SecurityError::from_tls(&e))?;
                Credentials::Server(Arc::new(config))
            }
            ApplicationRole::Client => {
                let builder = ClientConfig::builder_with_protocol_versions(&versions)
                    .with_root_certificates(build_root_store());
                let config = match &certificate {
                    Some(certificate) if certificate.has_private_key() => {
                        let key = certificate.key().ok_or_else(|| {
                            SecurityError::new(
                                SecurityError::CODE_BAD_CONFIGURATION,
                                "client certificate has no private key",
                            )
                        })?;
                        builder
                            .with_client_auth_cert(certificate.chain().to_vec(), key)
                            .map_err(|e| SecurityError::from_tls(&e))?
                    }
                    _ => builder.with_no_client_auth(),
                };
                Credentials::Client(Arc::new(config))
            }
        };
        Ok(SecurityContext {
            role,
            protocols,
            certificate,
            credentials,
        })
    }

    pub fn role(&self) -> ApplicationRole {
        self.role
    }

    pub fn protocols(&self) -> SecurityProtocol {
        self.protocols
    }

    pub fn certificate(&self) -> Option<&Certificate> {
        self.certificate.as_ref()
    }

    /// Client configuration for use with [`rustls::ClientConnection`].
    /// Only available on client contexts.
    pub fn client_config(&self) -> Result<Arc<ClientConfig>, SecurityError> {
        match &self.credentials {
            Credentials::Client(config) => Ok(Arc::clone(config)),
            Credentials::Server(_) => Err(SecurityError::new(
                SecurityError::CODE_INVALID_ROLE,
                "not a client context",
            )),
        }
    }

    /// Run the server-side handshake over `stream`.
    pub fn accept_connection<S: Read + Write>(
        &self,
        stream: &mut S,
    ) -> Result<SecureConnection, SecurityError> {
        self.accept_connection_with_flags(stream, AcceptConnectionFlags::NONE)
    }

    /// Run the server-side handshake, optionally demanding a client
    /// certificate. On failure no connection is produced and any pending
    /// TLS alert is flushed to the peer.
    pub fn accept_connection_with_flags<S: Read + Write>(
        &self,
        stream: &mut S,
        flags: AcceptConnectionFlags,
    ) -> Result<SecureConnection, SecurityError> {
        let config = match &self.credentials {
            Credentials::Server(config) => {
                if flags.contains(AcceptConnectionFlags::MUTUAL_AUTHENTICATION) {
                    self.server_config_with_client_auth()?
                } else {
                    Arc::clone(config)
                }
            }
            Credentials::Client(_) => {
                return Err(SecurityError::new(
                    SecurityError::CODE_INVALID_ROLE,
                    "client contexts cannot accept connections",
                ));
            }
        };

        // The token buffer is reused across iterations; allocation
        // failure is reported before any network I/O happens.
        let mut token_buf: Vec<u8> = Vec::new();
        token_buf
            .try_reserve_exact(HANDSHAKE_BUFFER_LEN)
            .map_err(|_| {
                SecurityError::new(
                    SecurityError::CODE_OUT_OF_MEMORY,
                    "cannot allocate handshake token buffer",
                )
            })?;
        token_buf.resize(HANDSHAKE_BUFFER_LEN, 0);

        let mut session =
            ServerConnection::new(config).map_err(|e| SecurityError::from_tls(&e))?;

        let mut state = HandshakeState::Handshaking;
        let mut failure = None;
        while state == HandshakeState::Handshaking {
            state = match handshake_round(&mut session, stream, &mut token_buf) {
                Ok(next) => next,
                Err(err) => {
                    // The session queues an alert for protocol failures.
                    if let Ok(alert) = take_output(&mut session) {
                        if !alert.is_empty() {
                            let _ = stream.write_all(&alert);
                        }
                    }
                    debug!("handshake failed: {}", err);
                    failure = Some(err);
                    HandshakeState::Failed
                }
            };
        }
        if state == HandshakeState::Failed {
            return Err(failure.unwrap_or_else(|| {
                SecurityError::new(SecurityError::CODE_TLS, "handshake failed")
            }));
        }

        debug!("handshake complete");
        Ok(SecureConnection::new(
            rustls::Connection::Server(session),
            self.certificate.clone(),
        ))
    }

    // Mutual auth verifies the client chain against the context's own
    // certificate chain acting as the trust root.
    fn server_config_with_client_auth(&self) -> Result<Arc<ServerConfig>, SecurityError> {
        let certificate = self.certificate.as_ref().ok_or_else(|| {
            SecurityError::new(
                SecurityError::CODE_BAD_CONFIGURATION,
                "server context requires a certificate",
            )
        })?;
        let key = certificate.key().ok_or_else(|| {
            SecurityError::new(
                SecurityError::CODE_BAD_CONFIGURATION,
                "server certificate has no private key",
            )
        })?;

        let mut roots = RootCertStore::empty();
        for der in certificate.chain() {
            roots
                .add(der.clone())
                .map_err(|e| SecurityError::from_tls(&e))?;
        }
        let verifier = WebPkiClientVerifier::builder(Arc::new(roots))
            .build()
            .map_err(|e| {
                SecurityError::new(SecurityError::CODE_BAD_CONFIGURATION, e.to_string())
            })?;

        let versions = protocol_versions(self.protocols)?;
        let config = ServerConfig::builder_with_protocol_versions(&versions)
            .with_client_cert_verifier(verifier)
            .with_single_cert(certificate.chain().to_vec(), key)
            .map_err(|e| SecurityError::from_tls(&e))?;
        Ok(Arc::new(config))
    }
}

impl fmt::Debug for SecurityContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SecurityContext")
            .field("role", &self.role)
            .field("protocols", &self.protocols)
            .field("certificate", &self.certificate)
            .finish()
    }
}

/// One blocking handshake round: read a token off the stream, feed it
/// to the session, and send back whatever the session produced.
fn handshake_round<S: Read + Write>(
    session: &mut ServerConnection,
    stream: &mut S,
    token_buf: &mut [u8],
) -> Result<HandshakeState, SecurityError> {
    let n = stream
        .read(token_buf)
        .map_err(|e| SecurityError::from_io(&e))?;
    if n == 0 {
        debug!("peer closed the stream mid-handshake");
        return Err(SecurityError::new(
            SecurityError::CODE_CONNECTION_CLOSED,
            "connection closed during handshake",
        ));
    }
    match handshake_step(session, &token_buf[..n])? {
        HandshakeStatus::Continue { token } => {
            if !token.is_empty() {
                stream
                    .write_all(&token)
                    .map_err(|e| SecurityError::from_io(&e))?;
            }
            Ok(HandshakeState::Handshaking)
        }
        HandshakeStatus::Complete { token } => {
            if !token.is_empty() {
                stream
                    .write_all(&token)
                    .map_err(|e| SecurityError::from_io(&e))?;
            }
            Ok(HandshakeState::Complete)
        }
    }
}

/// Feed one input token into the session and classify the outcome.
fn handshake_step(
    session: &mut ServerConnection,
    input: &[u8],
) -> Result<HandshakeStatus, SecurityError> {
    let mut rd = input;
    while !rd.is_empty() {
        session
            .read_tls(&mut rd)
            .map_err(|e| SecurityError::from_io(&e))?;
    }
    session
        .process_new_packets()
        .map_err(|e| SecurityError::from_tls(&e))?;
    let token = take_output(session)?;
    if session.is_handshaking() {
        Ok(HandshakeStatus::Continue { token })
    } else {
        Ok(HandshakeStatus::Complete { token })
    }
}

fn take_output(session: &mut ServerConnection) -> Result<Vec<u8>, SecurityError> {
    let mut out = Vec::new();
    while session.wants_write() {
        session
            .write_tls(&mut out)
            .map_err(|e| SecurityError::from_io(&e))?;
    }
    Ok(out)
}

fn protocol_versions(
    protocols: SecurityProtocol,
) -> Result<Vec<&'static SupportedProtocolVersion>, SecurityError> {
    for legacy in [
        SecurityProtocol::SSL_2_0,
        SecurityProtocol::SSL_3_0,
        SecurityProtocol::TLS_1_0,
        SecurityProtocol::TLS_1_1,
    ] {
        if protocols.contains(legacy) {
            return Err(SecurityError::new(
                SecurityError::CODE_BAD_CONFIGURATION,
                "only TLS 1.2 and TLS 1.3 are supported",
            ));
        }
    }
    let mut versions = Vec::new();
    if protocols.contains(SecurityProtocol::TLS_1_2) {
        versions.push(&rustls::version::TLS12);
    }
    if protocols.contains(SecurityProtocol::TLS_1_3) {
        versions.push(&rustls::version::TLS13);
    }
    if versions.is_empty() {
        return Err(SecurityError::new(
            SecurityError::CODE_BAD_CONFIGURATION,
            "no usable protocol version selected",
        ));
    }
    Ok(versions)
}

/// Root certificate store: platform native certs first, then
/// webpki-roots as fallback.
fn build_root_store() -> RootCertStore {
    let mut root_store = RootCertStore::empty();
    match rustls_native_certs::load_native_certs() {
        Ok(certs) => {
            for cert in certs {
                let _ = root_store.add(cert);
            }
        }
        Err(_) => {}
    }
    if root_store.is_empty() {
        root_store.roots = webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();
    }
    root_store
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_certificate() -> Certificate {
        Certificate::from_pem_files(
            concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/localhost-cert.pem"),
            concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/localhost-key.pem"),
        )
        .unwrap()
    }

    #[test]
    fn protocol_bitset() {
        let both = SecurityProtocol::TLS_1_2 | SecurityProtocol::TLS_1_3;
        assert!(both.contains(SecurityProtocol::TLS_1_2));
        assert!(both.contains(SecurityProtocol::TLS_1_3));
        assert!(!both.contains(SecurityProtocol::SSL_3_0));
    }

    #[test]
    fn legacy_protocols_are_refused() {
        let err = SecurityContext::new(
            Some(server_certificate()),
            SecurityProtocol::SSL_3_0 | SecurityProtocol::TLS_1_2,
            ApplicationRole::Server,
        )
        .unwrap_err();
        assert_eq!(err.code(), SecurityError::CODE_BAD_CONFIGURATION);
    }

    #[test]
    fn server_context_requires_a_key() {
        let err = SecurityContext::new(None, SecurityProtocol::TLS_1_3, ApplicationRole::Server)
            .unwrap_err();
        assert_eq!(err.code(), SecurityError::CODE_BAD_CONFIGURATION);

        let cert_only = Certificate::from_pem_file(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/data/localhost-cert.pem"
        ))
        .unwrap();
        let err = SecurityContext::new(
            Some(cert_only),
            SecurityProtocol::TLS_1_3,
            ApplicationRole::Server,
        )
        .unwrap_err();
        assert_eq!(err.code(), SecurityError::CODE_BAD_CONFIGURATION);
    }

    #[test]
    fn contexts_are_debuggable() {
        let ctx = SecurityContext::new(
            Some(server_certificate()),
            SecurityProtocol::TLS_1_3,
            ApplicationRole::Server,
        )
        .unwrap();
        let rendered = format!("{:?}", ctx);
        assert!(rendered.starts_with("SecurityContext"));
        assert!(rendered.contains("Server"));
    }

    #[test]
    fn client_context_needs_no_certificate() {
        let ctx =
            SecurityContext::new(None, SecurityProtocol::TLS_1_3, ApplicationRole::Client).unwrap();
        assert_eq!(ctx.role(), ApplicationRole::Client);
        assert!(ctx.certificate().is_none());
        assert!(ctx.client_config().is_ok());
    }

    #[test]
    fn client_contexts_cannot_accept() {
        let ctx =
            SecurityContext::new(None, SecurityProtocol::TLS_1_3, ApplicationRole::Client).unwrap();
        let mut stream = std::io::Cursor::new(Vec::new());
        let err = ctx.accept_connection(&mut stream).unwrap_err();
        assert_eq!(err.code(), SecurityError::CODE_INVALID_ROLE);
    }
}
