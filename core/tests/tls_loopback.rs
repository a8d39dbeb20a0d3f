/*
 * tls_loopback.rs
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

//! End-to-end TLS tests over a loopback socket: the server side runs
//! through the library's handshake and record layer, the client side is
//! a plain rustls connection that trusts anything.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, DigitallySignedStruct, SignatureScheme, StreamOwned};

use vnet_core::security::{
    AcceptConnectionFlags, ApplicationRole, Certificate, SecurityContext, SecurityError,
    SecurityProtocol, TLS_MAX_FRAGMENT_LEN,
};

fn server_certificate() -> Certificate {
    Certificate::from_pem_files(
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/localhost-cert.pem"),
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/localhost-key.pem"),
    )
    .unwrap()
}

// Leaf issued by the localhost certificate, for the mutual auth exchange.
fn client_certificate() -> Certificate {
    Certificate::from_pem_files(
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/client-cert.pem"),
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/client-key.pem"),
    )
    .unwrap()
}

fn server_context() -> SecurityContext {
    SecurityContext::new(
        Some(server_certificate()),
        SecurityProtocol::TLS_1_2 | SecurityProtocol::TLS_1_3,
        ApplicationRole::Server,
    )
    .unwrap()
}

// The fixture certificate is self-signed, so the test client skips
// verification entirely.
#[derive(Debug)]
struct AcceptAnyCert(rustls::crypto::CryptoProvider);

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

fn connect_client(addr: SocketAddr) -> StreamOwned<ClientConnection, TcpStream> {
    connect_client_with(addr, None)
}

fn connect_client_with(
    addr: SocketAddr,
    client_cert: Option<&Certificate>,
) -> StreamOwned<ClientConnection, TcpStream> {
    let provider = rustls::crypto::aws_lc_rs::default_provider();
    let builder = ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCert(provider)));
    let config = match client_cert {
        Some(cert) => builder
            .with_client_auth_cert(cert.chain().to_vec(), cert.key().unwrap())
            .unwrap(),
        None => builder.with_no_client_auth(),
    };
    let session =
        ClientConnection::new(Arc::new(config), ServerName::try_from("localhost").unwrap())
            .unwrap();
    let stream = TcpStream::connect(addr).unwrap();
    StreamOwned::new(session, stream)
}

/// Receive one application message: plaintext already buffered by the
/// handshake (the client may batch its first record with the handshake
/// flight), or the next record off the wire.
fn receive_message(
    connection: &mut vnet_core::security::SecureConnection,
    stream: &mut TcpStream,
) -> Vec<u8> {
    let buffered = connection.decrypt(&[]).unwrap();
    if !buffered.is_empty() {
        return buffered;
    }
    let record = read_record(stream);
    connection.decrypt(&record).unwrap()
}

/// Read one complete TLS record from the stream.
fn read_record(stream: &mut TcpStream) -> Vec<u8> {
    let mut header = [0u8; 5];
    stream.read_exact(&mut header).unwrap();
    let body_len = u16::from_be_bytes([header[3], header[4]]) as usize;
    let mut record = header.to_vec();
    record.resize(5 + body_len, 0);
    stream.read_exact(&mut record[5..]).unwrap();
    record
}

#[test]
fn echo_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let context = server_context();
        let mut connection = context.accept_connection(&mut stream).unwrap();

        assert!(connection.certificate().is_some());
        assert_eq!(connection.peer_certificate(), None);
        assert!(format!("{:?}", connection).starts_with("SecureConnection"));

        let plaintext = receive_message(&mut connection, &mut stream);
        assert_eq!(plaintext, b"ping");

        let wire = connection.encrypt(b"pong").unwrap();
        stream.write_all(&wire).unwrap();
    });

    let mut client = connect_client(addr);
    client.write_all(b"ping").unwrap();
    client.flush().unwrap();

    let mut reply = [0u8; 4];
    client.read_exact(&mut reply).unwrap();
    assert_eq!(&reply, b"pong");

    server.join().unwrap();
}

#[test]
fn strict_encrypt_rejects_oversized_messages() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let context = server_context();
        let mut connection = context.accept_connection(&mut stream).unwrap();

        // Drain the client's one-byte message so the session is settled.
        let plaintext = receive_message(&mut connection, &mut stream);
        assert_eq!(plaintext, b"x");

        let max_chunk = connection.stream_sizes().max_chunk();
        let err = connection.encrypt(&vec![0u8; max_chunk + 1]).unwrap_err();
        assert_eq!(err.code(), SecurityError::CODE_MESSAGE_TOO_LONG);

        // The chunking variant takes the same input and frames it as a
        // sequence of records, none larger than the session maximum.
        let wire = connection
            .encrypt_large_message(&vec![7u8; 40000])
            .unwrap();
        let mut offset = 0;
        let mut frames = 0;
        while offset < wire.len() {
            assert_eq!(wire[offset], 23); // application data
            let body_len = u16::from_be_bytes([wire[offset + 3], wire[offset + 4]]) as usize;
            assert!(body_len <= TLS_MAX_FRAGMENT_LEN);
            offset += 5 + body_len;
            frames += 1;
        }
        assert_eq!(offset, wire.len());
        assert!(frames >= 3);

        // Every encrypted record advances the session's sequence numbers,
        // so the frames must actually reach the peer.
        stream.write_all(&wire).unwrap();

        let done = connection.encrypt(b"done").unwrap();
        stream.write_all(&done).unwrap();
    });

    let mut client = connect_client(addr);
    client.write_all(b"x").unwrap();
    client.flush().unwrap();

    let mut bulk = vec![0u8; 40000];
    client.read_exact(&mut bulk).unwrap();
    assert!(bulk.iter().all(|&b| b == 7));

    let mut reply = [0u8; 4];
    client.read_exact(&mut reply).unwrap();
    assert_eq!(&reply, b"done");

    server.join().unwrap();
}

#[test]
fn mutual_authentication_presents_peer_certificate() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let context = server_context();
        let mut connection = context
            .accept_connection_with_flags(
                &mut stream,
                AcceptConnectionFlags::MUTUAL_AUTHENTICATION,
            )
            .unwrap();

        let peer = connection.peer_certificate().expect("client certificate");
        assert_eq!(peer, client_certificate());

        let plaintext = receive_message(&mut connection, &mut stream);
        assert_eq!(plaintext, b"ping");
        let wire = connection.encrypt(b"pong").unwrap();
        stream.write_all(&wire).unwrap();
    });

    let client_cert = client_certificate();
    let mut client = connect_client_with(addr, Some(&client_cert));
    client.write_all(b"ping").unwrap();
    client.flush().unwrap();

    let mut reply = [0u8; 4];
    client.read_exact(&mut reply).unwrap();
    assert_eq!(&reply, b"pong");

    server.join().unwrap();
}

#[test]
fn failed_handshake_yields_no_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let context = server_context();
        context.accept_connection(&mut stream).unwrap_err()
    });

    let mut raw = TcpStream::connect(addr).unwrap();
    raw.write_all(b"GET / HTTP/1.1\r\n\r\n").unwrap();

    let err = server.join().unwrap();
    assert_eq!(err.code(), SecurityError::CODE_TLS);
}
