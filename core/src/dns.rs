/*
 * dns.rs
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

//! Blocking hostname resolution over the system resolver (getaddrinfo).
//! The std resolver cannot request canonical names, so `canonical_name`
//! echoes the queried hostname and `aliases` stays empty.

use std::net::{IpAddr, ToSocketAddrs};

use log::debug;

use crate::socket::SocketError;

/// Result of a forward lookup: the queried name plus every distinct address
/// the resolver returned, in resolver order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsLookupResult {
    canonical_name: String,
    aliases: Vec<String>,
    addresses: Vec<IpAddr>,
}

impl DnsLookupResult {
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn addresses(&self) -> &[IpAddr] {
        &self.addresses
    }
}

/// Resolve `hostname` to its address set. Blocks for the duration of the
/// system call; lookup failure surfaces as a transport error.
pub fn resolve(hostname: &str) -> Result<DnsLookupResult, SocketError> {
    let addrs = (hostname, 0u16)
        .to_socket_addrs()
        .map_err(SocketError::from_io)?;

    let mut addresses: Vec<IpAddr> = Vec::new();
    for addr in addrs {
        if !addresses.contains(&addr.ip()) {
            addresses.push(addr.ip());
        }
    }
    debug!("resolved {} to {} address(es)", hostname, addresses.len());

    Ok(DnsLookupResult {
        canonical_name: hostname.to_string(),
        aliases: Vec::new(),
        addresses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_localhost() {
        let result = resolve("localhost").unwrap();
        assert_eq!(result.canonical_name(), "localhost");
        assert!(!result.addresses().is_empty());
        assert!(result.addresses().iter().all(|a| a.is_loopback()));
    }

    #[test]
    fn resolve_numeric_address() {
        let result = resolve("127.0.0.1").unwrap();
        assert_eq!(result.addresses(), ["127.0.0.1".parse::<IpAddr>().unwrap()]);
    }
}
