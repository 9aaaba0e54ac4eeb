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

//! Reqwest-based HTTP transport for manta.
//!
//! `ReqwestHttpSend` implements [`manta_core::HttpSend`] on top of a pooled
//! `reqwest::Client`. Transport failures are classified so that the retry
//! executor can tell transient conditions apart:
//!
//! - connection refused → [`ErrorKind::ConnectionRefused`](manta_core::ErrorKind::ConnectionRefused)
//! - request or response timeout → [`ErrorKind::Timeout`](manta_core::ErrorKind::Timeout)
//! - anything else → [`ErrorKind::Transport`](manta_core::ErrorKind::Transport)
//!
//! Settings such as TLS verification and timeouts are fixed when the transport
//! is constructed and never change afterwards.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use log::debug;
use manta_core::{Error, HttpSend, Result};
use reqwest::{Client, Request};
use std::io;
use std::time::Duration;

/// HTTP transport backed by `reqwest`.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a transport with TLS verification and timeout fixed up front.
    ///
    /// `tls_insecure` disables certificate verification; only use it against test
    /// deployments with self-signed certificates.
    pub fn with_options(tls_insecure: bool, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(tls_insecure);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::invalid_argument("failed to build http client").with_source(e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::invalid_argument("failed to convert request").with_source(e))?;
        debug!("sending {} {}", req.method(), req.url());

        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(classify_error)?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(classify_error)?;
        Ok(http::Response::from_parts(parts, bs))
    }
}

fn classify_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout("request timed out").with_source(err)
    } else if err.is_connect() && is_connection_refused(&err) {
        Error::connection_refused("connection refused").with_source(err)
    } else {
        Error::transport(format!("http transport failed: {err}")).with_source(err)
    }
}

fn is_connection_refused(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(e) = source {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        source = e.source();
    }
    false
}
