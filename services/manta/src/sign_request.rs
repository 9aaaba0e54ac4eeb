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

use crate::credential::Credential;
use log::debug;
use manta_core::hash::base64_encode;
use manta_core::time::{format_http_date, DateTime};
use manta_core::Result;
use std::fmt::Write;
use std::sync::Arc;

/// RequestSigner renders manta's HTTP signature authorization header.
///
/// Every request signs the single line `date: <http-date>`:
///
/// ```text
/// Signature keyId="/<user>/keys/<fingerprint>",algorithm="rsa-sha1",signature="<base64>"
/// ```
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credential: Arc<Credential>,
}

impl RequestSigner {
    /// Create a new signer over a shared credential.
    pub fn new(credential: Arc<Credential>) -> Self {
        Self { credential }
    }

    /// The credential this signer uses.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Sign a canonical string, returning the base64 signature.
    pub fn sign_string(&self, string_to_sign: &str) -> Result<String> {
        debug!("string to sign: {string_to_sign:?}");
        let signature = self.credential.sign(string_to_sign.as_bytes())?;
        Ok(base64_encode(&signature))
    }

    /// Build the authorization header value for a canonical string.
    pub fn authorization(&self, string_to_sign: &str) -> Result<String> {
        let signature = self.sign_string(string_to_sign)?;

        let mut auth = String::new();
        write!(auth, "Signature keyId=\"{}\",", self.credential.key_id())?;
        write!(
            auth,
            "algorithm=\"{}\",",
            self.credential.algorithm().as_str()
        )?;
        write!(auth, "signature=\"{signature}\"")?;
        Ok(auth)
    }

    /// Sign a request date, returning the `Date` and `Authorization` header values.
    pub fn sign_date(&self, date: DateTime) -> Result<(String, String)> {
        let date = format_http_date(date);
        let auth = self.authorization(&format!("date: {date}"))?;
        Ok((date, auth))
    }
}
