/*
 * method.rs
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

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};

use super::RegistryError;

/// A request method, identified numerically. The standard methods are
/// built in; applications may register additional tokens at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Method(u16);

const BUILTIN_METHODS: &[(u16, &str)] = &[
    (1, "GET"),
    (2, "HEAD"),
    (3, "POST"),
    (4, "PUT"),
    (5, "DELETE"),
    (6, "CONNECT"),
    (7, "OPTIONS"),
    (8, "TRACE"),
    (9, "PATCH"),
];

fn custom_methods() -> &'static Mutex<HashMap<u16, String>> {
    static CUSTOM: OnceLock<Mutex<HashMap<u16, String>>> = OnceLock::new();
    CUSTOM.get_or_init(|| Mutex::new(HashMap::new()))
}

impl Method {
    pub const GET: Method = Method(1);
    pub const HEAD: Method = Method(2);
    pub const POST: Method = Method(3);
    pub const PUT: Method = Method(4);
    pub const DELETE: Method = Method(5);
    pub const CONNECT: Method = Method(6);
    pub const OPTIONS: Method = Method(7);
    pub const TRACE: Method = Method(8);
    pub const PATCH: Method = Method(9);

    pub fn id(&self) -> u16 {
        self.0
    }

    /// The wire token for this method, or None if the identifier is not
    /// registered.
    pub fn as_token(&self) -> Option<String> {
        if let Some((_, token)) = BUILTIN_METHODS.iter().find(|(id, _)| *id == self.0) {
            return Some((*token).to_string());
        }
        custom_methods().lock().unwrap().get(&self.0).cloned()
    }

    /// Resolve a wire token to a method. Tokens are case-sensitive.
    pub fn from_token(token: &str) -> Option<Method> {
        if let Some((id, _)) = BUILTIN_METHODS.iter().find(|(_, t)| *t == token) {
            return Some(Method(*id));
        }
        custom_methods()
            .lock()
            .unwrap()
            .iter()
            .find(|(_, t)| t.as_str() == token)
            .map(|(id, _)| Method(*id))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.as_token() {
            Some(token) => f.write_str(&token),
            None => write!(f, "method#{}", self.0),
        }
    }
}

/// Register a custom method token under `id`. Identifiers bound to
/// built-in methods are refused, as are identifiers already registered.
pub fn register_method(id: u16, token: &str) -> Result<Method, RegistryError> {
    if BUILTIN_METHODS.iter().any(|(builtin, _)| *builtin == id) {
        return Err(RegistryError::CannotReregister);
    }
    let mut customs = custom_methods().lock().unwrap();
    if customs.contains_key(&id) {
        return Err(RegistryError::AlreadyRegistered);
    }
    customs.insert(id, token.to_string());
    Ok(Method(id))
}

/// Remove a custom method. Built-in methods cannot be removed.
pub fn unregister_method(method: Method) -> Result<(), RegistryError> {
    if BUILTIN_METHODS.iter().any(|(id, _)| *id == method.0) {
        return Err(RegistryError::CannotUnregister);
    }
    let mut customs = custom_methods().lock().unwrap();
    if customs.remove(&method.0).is_none() {
        return Err(RegistryError::DoesNotExist);
    }
    Ok(())
}
