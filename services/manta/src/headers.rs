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

use crate::constants::*;
use crate::options::*;
use crate::sign_request::RequestSigner;
use bytes::Bytes;
use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
    AUTHORIZATION, DATE, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE, ORIGIN,
};
use http::{HeaderName, HeaderValue};
use manta_core::hash::base64_md5;
use manta_core::time::DateTime;
use manta_core::{Error, Result};

/// Ordered header list, built append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderSet {
    /// Create an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header, failing with `InvalidArgument` on an invalid value.
    pub fn push(&mut self, name: impl Into<HeaderName>, value: &str) -> Result<()> {
        let name = name.into();
        let value = HeaderValue::from_str(value).map_err(|e| {
            Error::invalid_argument(format!("invalid value for header {name}")).with_source(e)
        })?;
        self.headers.push((name, value));
        Ok(())
    }

    /// Append a header with a value that is already checked.
    pub fn push_value(&mut self, name: impl Into<HeaderName>, value: HeaderValue) {
        self.headers.push((name.into(), value));
    }

    /// The first value of a header.
    pub fn get(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        let name = name.as_ref();
        self.headers
            .iter()
            .find(|(k, _)| k.as_str().eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// How many times a header appears.
    pub fn count(&self, name: impl AsRef<str>) -> usize {
        let name = name.as_ref();
        self.headers
            .iter()
            .filter(|(k, _)| k.as_str().eq_ignore_ascii_case(name))
            .count()
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterate headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.headers.iter().map(|(k, v)| (k, v))
    }

    /// Copy every header into a request builder, preserving order.
    pub fn apply(&self, mut builder: http::request::Builder) -> http::request::Builder {
        for (k, v) in &self.headers {
            builder = builder.header(k, v);
        }
        builder
    }
}

/// HeaderAssembler builds the outbound headers of a request.
///
/// [`HeaderAssembler::prepare`] validates options and builds everything that
/// stays the same across attempts. [`HeaderAssembler::sign`] adds a fresh
/// `Date` and `Authorization` and is called once per attempt.
#[derive(Debug, Clone)]
pub struct HeaderAssembler {
    signer: RequestSigner,
}

impl HeaderAssembler {
    /// Create a new assembler.
    pub fn new(signer: RequestSigner) -> Self {
        Self { signer }
    }

    /// Validate options and build the attempt independent headers.
    ///
    /// `allow_cors` is true only for calls that store CORS declarations
    /// (put object and put directory).
    pub fn prepare(
        &self,
        options: &RequestOptions,
        body: Option<&Bytes>,
        allow_cors: bool,
    ) -> Result<HeaderSet> {
        let mut headers = HeaderSet::new();
        headers.push_value(http::header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers.push_value(
            HeaderName::from_static(ACCEPT_VERSION),
            HeaderValue::from_static(API_VERSION),
        );

        if let Some(v) = &options.if_modified_since {
            headers.push(IF_MODIFIED_SINCE, &v.to_http_date()?)?;
        }
        if let Some(v) = &options.if_unmodified_since {
            headers.push(IF_UNMODIFIED_SINCE, &v.to_http_date()?)?;
        }
        if let Some(v) = &options.if_match {
            validate_etag("if_match", v)?;
            headers.push(IF_MATCH, v)?;
        }
        if let Some(v) = &options.if_none_match {
            validate_etag("if_none_match", v)?;
            headers.push(IF_NONE_MATCH, v)?;
        }
        if let Some(v) = &options.origin {
            validate_origin(v)?;
            headers.push(ORIGIN, v)?;
        }

        if let Some(body) = body {
            headers.push(HeaderName::from_static(CONTENT_MD5), &base64_md5(body))?;
        }

        if options.has_cors_declarations() {
            if !allow_cors {
                return Err(Error::invalid_argument(
                    "CORS declarations are only allowed when storing objects or directories",
                ));
            }
            self.push_cors_declarations(&mut headers, options)?;
        }

        Ok(headers)
    }

    fn push_cors_declarations(&self, headers: &mut HeaderSet, options: &RequestOptions) -> Result<()> {
        if let Some(v) = &options.allow_credentials {
            headers.push(ACCESS_CONTROL_ALLOW_CREDENTIALS, canonical_allow_credentials(v)?)?;
        }
        if let Some(v) = &options.allow_headers {
            headers.push(
                ACCESS_CONTROL_ALLOW_HEADERS,
                &canonical_header_list("allow_headers", v)?,
            )?;
        }
        if let Some(v) = &options.allow_methods {
            headers.push(ACCESS_CONTROL_ALLOW_METHODS, &canonical_method_list(v)?)?;
        }
        if let Some(v) = &options.allow_origin {
            validate_allow_origin(v)?;
            headers.push(ACCESS_CONTROL_ALLOW_ORIGIN, v)?;
        }
        if let Some(v) = &options.expose_headers {
            headers.push(
                ACCESS_CONTROL_EXPOSE_HEADERS,
                &canonical_header_list("expose_headers", v)?,
            )?;
        }
        if let Some(v) = options.max_age {
            headers.push(ACCESS_CONTROL_MAX_AGE, &validate_max_age(v)?)?;
        }
        Ok(())
    }

    /// Build the headers of one attempt: `Date` and `Authorization` first, then `base`.
    pub fn sign(&self, base: &HeaderSet, now: DateTime) -> Result<HeaderSet> {
        let (date, auth) = self.signer.sign_date(now)?;

        let mut headers = HeaderSet::new();
        headers.push(DATE, &date)?;
        headers.push(AUTHORIZATION, &auth)?;
        for (k, v) in base.iter() {
            if *k == DATE || *k == AUTHORIZATION {
                continue;
            }
            headers.push_value(k.clone(), v.clone());
        }
        Ok(headers)
    }
}
