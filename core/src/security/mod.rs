/*
 * mod.rs
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

//! TLS over blocking streams: certificates, security contexts that run
//! the server-side handshake, and secure connections that encrypt and
//! decrypt application records.

mod certificate;
mod connection;
mod context;
mod error;

pub use certificate::{Certificate, CertificateStore};
pub use connection::{
    SecureConnection, StreamSizes, TLS_MAX_FRAGMENT_LEN, TLS_RECORD_HEADER_LEN,
    TLS_RECORD_TRAILER_LEN,
};
pub use context::{AcceptConnectionFlags, ApplicationRole, SecurityContext, SecurityProtocol};
pub use error::SecurityError;
