/*
 * cookie.rs
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

use crate::date::Date;

/// SameSite attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// A Set-Cookie value. Display renders the attributes in a fixed order
/// so a given cookie always serializes identically.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpCookie {
    name: String,
    value: String,
    expiration_date: Option<Date>,
    max_age: Option<i64>,
    domain: Option<String>,
    path: Option<String>,
    same_site: Option<SameSite>,
    secure: bool,
    http_only: bool,
}

impl HttpCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> HttpCookie {
        HttpCookie {
            name: name.into(),
            value: value.into(),
            expiration_date: None,
            max_age: None,
            domain: None,
            path: None,
            same_site: None,
            secure: false,
            http_only: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn expiration_date(&self) -> Option<Date> {
        self.expiration_date
    }

    pub fn set_expiration_date(&mut self, date: Option<Date>) {
        self.expiration_date = date;
    }

    pub fn max_age(&self) -> Option<i64> {
        self.max_age
    }

    pub fn set_max_age(&mut self, seconds: Option<i64>) {
        self.max_age = seconds;
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn set_domain(&mut self, domain: Option<String>) {
        self.domain = domain;
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: Option<String>) {
        self.path = path;
    }

    pub fn same_site(&self) -> Option<SameSite> {
        self.same_site
    }

    pub fn set_same_site(&mut self, same_site: Option<SameSite>) {
        self.same_site = same_site;
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn set_secure(&mut self, secure: bool) {
        self.secure = secure;
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    pub fn set_http_only(&mut self, http_only: bool) {
        self.http_only = http_only;
    }
}

impl fmt::Display for HttpCookie {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(date) = self.expiration_date {
            write!(f, "; Expires={}", date.to_utc_string())?;
        }
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age)?;
        }
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={}", domain)?;
        }
        if let Some(path) = &self.path {
            write!(f, "; Path={}", path)?;
        }
        if let Some(same_site) = self.same_site {
            write!(f, "; SameSite={}", same_site.as_str())?;
        }
        if self.secure {
            write!(f, "; Secure")?;
        }
        if self.http_only {
            write!(f, "; HttpOnly")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_name_value_only() {
        let cookie = HttpCookie::new("session", "abc123");
        assert_eq!(cookie.to_string(), "session=abc123");
    }

    #[test]
    fn renders_attributes_in_fixed_order() {
        let mut cookie = HttpCookie::new("id", "42");
        cookie.set_http_only(true);
        cookie.set_secure(true);
        cookie.set_path(Some("/app".to_string()));
        cookie.set_domain(Some("example.com".to_string()));
        cookie.set_max_age(Some(3600));
        cookie.set_same_site(Some(SameSite::Lax));
        cookie.set_expiration_date(Some(Date::from_unix_seconds(784111777)));
        assert_eq!(
            cookie.to_string(),
            "id=42; Expires=Sun, 06 Nov 1994 08:49:37 GMT; Max-Age=3600; \
             Domain=example.com; Path=/app; SameSite=Lax; Secure; HttpOnly"
        );
    }

    #[test]
    fn flags_render_bare() {
        let mut cookie = HttpCookie::new("a", "b");
        cookie.set_secure(true);
        assert_eq!(cookie.to_string(), "a=b; Secure");
    }
}
