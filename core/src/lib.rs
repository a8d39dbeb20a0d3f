/*
 * lib.rs
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

//! Vnet: a blocking networking library.
//!
//! Layers, bottom up: `socket` (BSD-style blocking TCP transport), `dns`
//! (system resolver wrapper), `uri` (strict RFC 3986-subset parser), `http`
//! (request/response codec for HTTP/0.9, 1.0 and 1.1 plus headers, cookies
//! and the method/status registries), and `security` (rustls-backed TLS
//! sessions: server handshake driver, record-layer encrypt/decrypt,
//! certificates). `thread_pool` is a building block for callers that want
//! to parallelize connection handling; nothing in the library uses it
//! internally.
//!
//! All I/O is synchronous: socket calls, DNS lookups and handshake rounds
//! block the calling thread. The codec and URI parser are pure functions
//! over their inputs.

pub mod date;
pub mod dns;
pub mod http;
pub mod security;
pub mod socket;
pub mod thread_pool;
pub mod uri;
