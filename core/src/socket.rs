/*
 * socket.rs
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

//! Blocking TCP transport: `Listener` (bind/accept) and `Connection`
//! (connect/send/receive/shutdown). Every failure carries the platform
//! error code when the OS supplied one. `Connection` implements
//! `io::Read`/`io::Write` so the TLS layer can drive any stream.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use log::debug;

/// Transport error: platform error code (0 when the OS did not supply one)
/// plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketError {
    code: i32,
    message: String,
}

impl SocketError {
    pub fn new(code: i32, message: impl Into<String>) -> SocketError {
        SocketError {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn from_io(err: io::Error) -> SocketError {
        SocketError {
            code: err.raw_os_error().unwrap_or(0),
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

impl fmt::Display for SocketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "socket error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for SocketError {}

/// Listening TCP socket. `bind` performs the BSD bind+listen pair; `accept`
/// blocks until a peer connects.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<Listener, SocketError> {
        let inner = TcpListener::bind(addr).map_err(SocketError::from_io)?;
        Ok(Listener { inner })
    }

    pub fn accept(&self) -> Result<(Connection, SocketAddr), SocketError> {
        let (stream, peer) = self.inner.accept().map_err(SocketError::from_io)?;
        debug!("accepted connection from {}", peer);
        Ok((Connection { inner: stream }, peer))
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SocketError> {
        self.inner.local_addr().map_err(SocketError::from_io)
    }
}

/// Established TCP connection with blocking send/receive.
#[derive(Debug)]
pub struct Connection {
    inner: TcpStream,
}

impl Connection {
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Connection, SocketError> {
        let inner = TcpStream::connect(addr).map_err(SocketError::from_io)?;
        Ok(Connection { inner })
    }

    /// Wrap an already-connected stream (e.g. one produced elsewhere).
    pub fn from_stream(stream: TcpStream) -> Connection {
        Connection { inner: stream }
    }

    /// Send once; returns the number of bytes the OS actually took.
    pub fn send(&mut self, data: &[u8]) -> Result<usize, SocketError> {
        self.inner.write(data).map_err(SocketError::from_io)
    }

    /// Send the whole buffer, looping over short writes.
    pub fn send_all(&mut self, data: &[u8]) -> Result<(), SocketError> {
        self.inner.write_all(data).map_err(SocketError::from_io)
    }

    /// Receive once into `buf`; returns the byte count, 0 on orderly
    /// shutdown by the peer.
    pub fn receive(&mut self, buf: &mut [u8]) -> Result<usize, SocketError> {
        self.inner.read(buf).map_err(SocketError::from_io)
    }

    pub fn shutdown(&self, how: Shutdown) -> Result<(), SocketError> {
        self.inner.shutdown(how).map_err(SocketError::from_io)
    }

    pub fn peer_addr(&self) -> Result<SocketAddr, SocketError> {
        self.inner.peer_addr().map_err(SocketError::from_io)
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SocketError> {
        self.inner.local_addr().map_err(SocketError::from_io)
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn loopback_send_receive() {
        let listener = Listener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut buf = [0u8; 16];
            let n = conn.receive(&mut buf).unwrap();
            conn.send_all(&buf[..n]).unwrap();
        });

        let mut client = Connection::connect(addr).unwrap();
        client.send_all(b"ping").unwrap();
        let mut buf = [0u8; 16];
        let n = client.receive(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ping");

        server.join().unwrap();
    }

    #[test]
    fn sockets_are_debuggable() {
        let listener = Listener::bind("127.0.0.1:0").unwrap();
        assert!(format!("{:?}", listener).starts_with("Listener"));
        let conn = Connection::connect(listener.local_addr().unwrap()).unwrap();
        assert!(format!("{:?}", conn).starts_with("Connection"));
    }

    #[test]
    fn connect_failure_reports_code() {
        // Port 1 on loopback is essentially never listening.
        let err = Connection::connect("127.0.0.1:1").unwrap_err();
        assert_ne!(err.code(), 0);
        assert!(!err.message().is_empty());
    }
}
