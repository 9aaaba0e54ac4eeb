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
use crate::paths::validate_private_path;
use crate::sign_request::RequestSigner;
use log::debug;
use manta_core::time::DateTime;
use manta_core::{Error, Result};
use percent_encoding::utf8_percent_encode;
use std::fmt::Write;

/// Expiry of a signed url.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expires {
    /// An absolute time.
    At(DateTime),
    /// Seconds since the unix epoch.
    Epoch(i64),
}

impl Expires {
    /// Seconds since the unix epoch.
    pub fn timestamp(&self) -> i64 {
        match self {
            Expires::At(t) => t.timestamp(),
            Expires::Epoch(v) => *v,
        }
    }
}

impl From<DateTime> for Expires {
    fn from(value: DateTime) -> Self {
        Expires::At(value)
    }
}

impl From<i64> for Expires {
    fn from(value: i64) -> Self {
        Expires::Epoch(value)
    }
}

/// UrlSigner produces self authenticating urls for a path in the private namespace.
///
/// The query carries `algorithm`, `expires` and `keyId` (plus `method` when
/// more than one method is allowed). The signed plaintext is
///
/// ```text
/// METHOD\nHOST\nPATH\nSORTED_ENCODED_QUERY
/// ```
///
/// and the base64 signature is appended as the last `signature` parameter.
/// Nothing here touches the network.
#[derive(Debug, Clone)]
pub struct UrlSigner {
    signer: RequestSigner,
    host: String,
}

impl UrlSigner {
    /// Create a url signer for a host. Any scheme and trailing `/` are dropped.
    pub fn new(signer: RequestSigner, host: &str) -> Self {
        let host = host
            .strip_prefix("https://")
            .or_else(|| host.strip_prefix("http://"))
            .unwrap_or(host)
            .trim_end_matches('/')
            .to_string();
        Self { signer, host }
    }

    /// The scheme free host urls are generated for.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Sign `path` for `methods` until `expires`, with optional extra query pairs.
    pub fn sign(
        &self,
        path: &str,
        methods: &[&str],
        expires: impl Into<Expires>,
        query: &[(&str, &str)],
    ) -> Result<String> {
        validate_private_path(path)?;
        let methods = canonical_methods(methods)?;

        let cred = self.signer.credential();
        let mut params: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        params.push((
            "algorithm".to_string(),
            cred.algorithm().as_str().to_uppercase(),
        ));
        params.push(("expires".to_string(), expires.into().timestamp().to_string()));
        params.push(("keyId".to_string(), cred.key_id()));
        if methods.len() > 1 {
            params.push(("method".to_string(), methods.join(",")));
        }
        params.sort();

        let encoded_query = canonical_query(&params);
        let encoded_path = utf8_percent_encode(path, &MANTA_PATH_ENCODE_SET).to_string();

        let string_to_sign = {
            let mut f = String::new();
            writeln!(f, "{}", methods.join(","))?;
            writeln!(f, "{}", self.host)?;
            writeln!(f, "{encoded_path}")?;
            write!(f, "{encoded_query}")?;
            f
        };
        debug!("signed url string to sign: {string_to_sign:?}");

        let signature = self.signer.sign_string(&string_to_sign)?;
        Ok(format!(
            "{}{}?{}&signature={}",
            self.host,
            encoded_path,
            encoded_query,
            utf8_percent_encode(&signature, &MANTA_QUERY_ENCODE_SET)
        ))
    }
}

/// Uppercase, sort and dedup `methods`, rejecting any outside [`SIGNED_URL_METHODS`].
fn canonical_methods(methods: &[&str]) -> Result<Vec<String>> {
    if methods.is_empty() {
        return Err(Error::invalid_argument("at least one method is required"));
    }

    let mut out = Vec::with_capacity(methods.len());
    for method in methods {
        let upper = method.trim().to_ascii_uppercase();
        if !SIGNED_URL_METHODS.contains(&upper.as_str()) {
            return Err(Error::invalid_argument(format!("invalid method {method:?}")));
        }
        out.push(upper);
    }
    out.sort();
    out.dedup();
    Ok(out)
}

fn canonical_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, &MANTA_QUERY_ENCODE_SET),
                utf8_percent_encode(v, &MANTA_QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
