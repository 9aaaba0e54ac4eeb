// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::constants::CORS_METHODS;
use manta_core::time::{format_http_date, parse_timestamp, DateTime};
use manta_core::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w-]+$").expect("header token regex must be valid"));

static ORIGIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://[^\s/:?#]+(:\d{1,5})?$")
        .expect("origin regex must be valid")
});

/// A timestamp for conditional headers, either parsed or still textual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    /// An already parsed time.
    Parsed(DateTime),
    /// Text in RFC 2822 / HTTP-date or RFC 3339 form, parsed when the request is built.
    Text(String),
}

impl Timestamp {
    /// Render as an HTTP-date, failing with `InvalidArgument` on unparsable text.
    pub fn to_http_date(&self) -> Result<String> {
        match self {
            Timestamp::Parsed(t) => Ok(format_http_date(*t)),
            Timestamp::Text(s) => Ok(format_http_date(parse_timestamp(s)?)),
        }
    }
}

impl From<DateTime> for Timestamp {
    fn from(value: DateTime) -> Self {
        Timestamp::Parsed(value)
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Timestamp::Text(value.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(value: String) -> Self {
        Timestamp::Text(value)
    }
}

/// Per call options.
///
/// Nothing here is checked until the call is made; every check happens
/// before the first network exchange.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// `If-Modified-Since`.
    pub if_modified_since: Option<Timestamp>,
    /// `If-Unmodified-Since`.
    pub if_unmodified_since: Option<Timestamp>,
    /// `If-Match` etag.
    pub if_match: Option<String>,
    /// `If-None-Match` etag.
    pub if_none_match: Option<String>,
    /// `Origin`: `null` or space separated `scheme://host[:port]` tokens.
    pub origin: Option<String>,

    /// `access-control-allow-credentials`, `true` or `false`.
    pub allow_credentials: Option<String>,
    /// `access-control-allow-headers`, comma separated header names.
    pub allow_headers: Option<String>,
    /// `access-control-allow-methods`, comma separated methods.
    pub allow_methods: Option<String>,
    /// `access-control-allow-origin`, `*`, `null` or an origin.
    pub allow_origin: Option<String>,
    /// `access-control-expose-headers`, comma separated header names.
    pub expose_headers: Option<String>,
    /// `access-control-max-age` in seconds.
    pub max_age: Option<i64>,

    /// Attempts for this call, overriding the client default.
    pub attempts: Option<u32>,
    /// Issue `HEAD` instead of `GET` where supported.
    pub head_only: bool,
}

impl RequestOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `If-Modified-Since`.
    pub fn with_if_modified_since(mut self, v: impl Into<Timestamp>) -> Self {
        self.if_modified_since = Some(v.into());
        self
    }

    /// Set `If-Unmodified-Since`.
    pub fn with_if_unmodified_since(mut self, v: impl Into<Timestamp>) -> Self {
        self.if_unmodified_since = Some(v.into());
        self
    }

    /// Set `If-Match`.
    pub fn with_if_match(mut self, etag: impl Into<String>) -> Self {
        self.if_match = Some(etag.into());
        self
    }

    /// Set `If-None-Match`.
    pub fn with_if_none_match(mut self, etag: impl Into<String>) -> Self {
        self.if_none_match = Some(etag.into());
        self
    }

    /// Set `Origin`.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Declare `access-control-allow-credentials`.
    pub fn with_allow_credentials(mut self, v: impl ToString) -> Self {
        self.allow_credentials = Some(v.to_string());
        self
    }

    /// Declare `access-control-allow-headers`.
    pub fn with_allow_headers(mut self, v: impl Into<String>) -> Self {
        self.allow_headers = Some(v.into());
        self
    }

    /// Declare `access-control-allow-methods`.
    pub fn with_allow_methods(mut self, v: impl Into<String>) -> Self {
        self.allow_methods = Some(v.into());
        self
    }

    /// Declare `access-control-allow-origin`.
    pub fn with_allow_origin(mut self, v: impl Into<String>) -> Self {
        self.allow_origin = Some(v.into());
        self
    }

    /// Declare `access-control-expose-headers`.
    pub fn with_expose_headers(mut self, v: impl Into<String>) -> Self {
        self.expose_headers = Some(v.into());
        self
    }

    /// Declare `access-control-max-age`.
    pub fn with_max_age(mut self, v: i64) -> Self {
        self.max_age = Some(v);
        self
    }

    /// Override the attempt budget.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    /// Issue `HEAD` instead of `GET`.
    pub fn with_head_only(mut self, head_only: bool) -> Self {
        self.head_only = head_only;
        self
    }

    /// Whether any CORS response declaration is set.
    pub fn has_cors_declarations(&self) -> bool {
        self.allow_credentials.is_some()
            || self.allow_headers.is_some()
            || self.allow_methods.is_some()
            || self.allow_origin.is_some()
            || self.expose_headers.is_some()
            || self.max_age.is_some()
    }
}

/// Check an etag for `If-Match` / `If-None-Match`.
pub fn validate_etag(name: &str, etag: &str) -> Result<()> {
    if etag.is_empty() {
        return Err(Error::invalid_argument(format!("{name} must not be empty")));
    }
    if etag.bytes().any(|b| b.is_ascii_control()) {
        return Err(Error::invalid_argument(format!(
            "{name} contains control characters"
        )));
    }
    Ok(())
}

/// Check an `Origin` value.
pub fn validate_origin(origin: &str) -> Result<()> {
    if origin == "null" {
        return Ok(());
    }

    let mut tokens = origin.split(' ').peekable();
    if tokens.peek().is_none() {
        return Err(Error::invalid_argument("origin must not be empty"));
    }
    for token in tokens {
        if !ORIGIN.is_match(token) {
            return Err(Error::invalid_argument(format!(
                "invalid origin: {origin}"
            )));
        }
    }
    Ok(())
}

/// Check an `access-control-allow-origin` value.
pub fn validate_allow_origin(v: &str) -> Result<()> {
    if v == "*" {
        return Ok(());
    }
    validate_origin(v)
        .map_err(|_| Error::invalid_argument(format!("invalid allow_origin: {v}")))
}

/// Check `access-control-allow-credentials`, returning `true` or `false`.
pub fn canonical_allow_credentials(v: &str) -> Result<&'static str> {
    match v.trim() {
        "true" => Ok("true"),
        "false" => Ok("false"),
        _ => Err(Error::invalid_argument(format!(
            "allow_credentials must be true or false, got {v}"
        ))),
    }
}

/// Canonicalize a header name list: lowercase, sorted, joined with `", "`.
///
/// Applying it to its own output is a no-op.
pub fn canonical_header_list(name: &str, v: &str) -> Result<String> {
    let mut tokens = Vec::new();
    for token in v.split(',').map(str::trim) {
        if !HEADER_TOKEN.is_match(token) {
            return Err(Error::invalid_argument(format!(
                "{name} contains invalid header name {token:?}"
            )));
        }
        tokens.push(token.to_ascii_lowercase());
    }
    tokens.sort();
    tokens.dedup();
    Ok(tokens.join(", "))
}

/// Canonicalize a method list: uppercase, in the order given, joined with `", "`.
pub fn canonical_method_list(v: &str) -> Result<String> {
    let mut methods: Vec<String> = Vec::new();
    for token in v.split(',').map(str::trim) {
        let method = token.to_ascii_uppercase();
        if !CORS_METHODS.contains(&method.as_str()) {
            return Err(Error::invalid_argument(format!(
                "allow_methods contains unsupported method {token:?}"
            )));
        }
        if !methods.contains(&method) {
            methods.push(method);
        }
    }
    Ok(methods.join(", "))
}

/// Check `access-control-max-age`.
pub fn validate_max_age(v: i64) -> Result<String> {
    if v < 0 {
        return Err(Error::invalid_argument(format!(
            "max_age must not be negative, got {v}"
        )));
    }
    Ok(v.to_string())
}
