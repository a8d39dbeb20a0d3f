/*
 * headers.rs
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

use std::error::Error;
use std::fmt;

/// A header field failed charset validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderFieldError {
    InvalidName(String),
    InvalidValue(String),
}

impl fmt::Display for HeaderFieldError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HeaderFieldError::InvalidName(name) => write!(f, "invalid header name: {}", name),
            HeaderFieldError::InvalidValue(value) => write!(f, "invalid header value: {}", value),
        }
    }
}

impl Error for HeaderFieldError {}

/// Ordered multimap of HTTP header fields. Names are stored lowercased;
/// duplicate names are kept in insertion order, so repeated fields such
/// as Set-Cookie survive a parse/serialize cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    fields: Vec<(String, String)>,
}

impl HttpHeaders {
    pub fn new() -> HttpHeaders {
        HttpHeaders { fields: Vec::new() }
    }

    /// Append a field. The name is lowercased before validation; both the
    /// name and value must pass the charset checks.
    pub fn add(&mut self, name: &str, value: &str) -> Result<(), HeaderFieldError> {
        let name = name.to_ascii_lowercase();
        if !Self::is_valid_header_name(&name) {
            return Err(HeaderFieldError::InvalidName(name));
        }
        if !Self::is_valid_header_value(value) {
            return Err(HeaderFieldError::InvalidValue(value.to_string()));
        }
        self.fields.push((name, value.to_string()));
        Ok(())
    }

    /// Replace every field named `name` with a single occurrence.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), HeaderFieldError> {
        let lowered = name.to_ascii_lowercase();
        self.fields.retain(|(n, _)| *n != lowered);
        self.add(&lowered, value)
    }

    /// Append a field without validation. Serialization revalidates every
    /// field, so anything invalid fed through here fails at that point.
    pub fn append_raw(&mut self, name: &str, value: &str) {
        self.fields
            .push((name.to_ascii_lowercase(), value.to_string()));
    }

    /// First value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        let lowered = name.to_ascii_lowercase();
        self.fields
            .iter()
            .find(|(n, _)| *n == lowered)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        let lowered = name.to_ascii_lowercase();
        self.fields
            .iter()
            .filter(|(n, _)| *n == lowered)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        let lowered = name.to_ascii_lowercase();
        self.fields.iter().any(|(n, _)| *n == lowered)
    }

    pub fn count_of(&self, name: &str) -> usize {
        let lowered = name.to_ascii_lowercase();
        self.fields.iter().filter(|(n, _)| *n == lowered).count()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Distinct field names, in order of first appearance.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (n, _) in &self.fields {
            if !names.contains(&n.as_str()) {
                names.push(n);
            }
        }
        names
    }

    /// Remove the first field named `name`; true if one was removed.
    pub fn delete(&mut self, name: &str) -> bool {
        let lowered = name.to_ascii_lowercase();
        if let Some(pos) = self.fields.iter().position(|(n, _)| *n == lowered) {
            self.fields.remove(pos);
            true
        } else {
            false
        }
    }

    /// Remove every field named `name`; returns how many were removed.
    pub fn delete_all(&mut self, name: &str) -> usize {
        let lowered = name.to_ascii_lowercase();
        let before = self.fields.len();
        self.fields.retain(|(n, _)| *n != lowered);
        before - self.fields.len()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Sort the fields by name, then by value. The codecs sort before
    /// serializing so output is deterministic regardless of insertion
    /// order.
    pub fn sort(&mut self) {
        self.fields.sort();
    }

    /// Valid names are ASCII letters, digits, `-` and `_`.
    pub fn is_valid_header_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }

    /// Valid values are ASCII letters, digits, space and a fixed set of
    /// punctuation.
    pub fn is_valid_header_value(value: &str) -> bool {
        const PUNCT: &[u8] = b"_ :;.,\\/\"'?!(){}[]@<>=-+*#$&`|~^%";
        value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || PUNCT.contains(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_lowercased() {
        let mut h = HttpHeaders::new();
        h.add("Content-Type", "text/html").unwrap();
        assert_eq!(h.get("content-type"), Some("text/html"));
        assert_eq!(h.get("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(h.names(), vec!["content-type"]);
    }

    #[test]
    fn duplicates_keep_insertion_order() {
        let mut h = HttpHeaders::new();
        h.add("set-cookie", "a=1").unwrap();
        h.add("set-cookie", "b=2").unwrap();
        assert_eq!(h.count_of("set-cookie"), 2);
        assert_eq!(h.get_all("set-cookie"), vec!["a=1", "b=2"]);
        assert_eq!(h.get("set-cookie"), Some("a=1"));
    }

    #[test]
    fn set_replaces_all_occurrences() {
        let mut h = HttpHeaders::new();
        h.add("accept", "text/plain").unwrap();
        h.add("accept", "text/html").unwrap();
        h.set("accept", "*/*").unwrap();
        assert_eq!(h.get_all("accept"), vec!["*/*"]);
    }

    #[test]
    fn rejects_bad_name() {
        let mut h = HttpHeaders::new();
        assert_eq!(
            h.add("bad name", "x"),
            Err(HeaderFieldError::InvalidName("bad name".to_string()))
        );
        assert!(h.add("", "x").is_err());
    }

    #[test]
    fn rejects_control_bytes_in_value() {
        let mut h = HttpHeaders::new();
        assert!(h.add("x-test", "line1\r\nline2").is_err());
        assert!(h.add("x-test", "ok value; q=0.9").is_ok());
    }

    #[test]
    fn delete_and_delete_all() {
        let mut h = HttpHeaders::new();
        h.add("via", "a").unwrap();
        h.add("via", "b").unwrap();
        assert!(h.delete("via"));
        assert_eq!(h.get_all("via"), vec!["b"]);
        h.add("via", "c").unwrap();
        assert_eq!(h.delete_all("via"), 2);
        assert!(!h.contains("via"));
        assert!(!h.delete("via"));
    }

    #[test]
    fn sort_orders_by_name_then_value() {
        let mut h = HttpHeaders::new();
        h.add("host", "example.com").unwrap();
        h.add("accept", "text/html").unwrap();
        h.add("accept", "application/json").unwrap();
        h.sort();
        let fields: Vec<(&str, &str)> = h.iter().collect();
        assert_eq!(
            fields,
            vec![
                ("accept", "application/json"),
                ("accept", "text/html"),
                ("host", "example.com"),
            ]
        );
    }

    #[test]
    fn append_raw_skips_validation() {
        let mut h = HttpHeaders::new();
        h.append_raw("bad name", "x");
        assert_eq!(h.len(), 1);
        assert!(!HttpHeaders::is_valid_header_name("bad name"));
    }
}
