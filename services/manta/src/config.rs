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
use manta_core::utils::Redact;
use manta_core::{Context, Error, Result};
use std::fmt::{Debug, Formatter};
use std::str::FromStr;
use std::time::Duration;

/// Config for a manta client.
#[derive(Clone, Default)]
pub struct Config {
    /// Service url, like `https://us-east.manta.example.com`.
    pub url: Option<String>,
    /// Account login.
    pub user: Option<String>,
    /// Expected key fingerprint, checked against the loaded key when set.
    pub key_id: Option<String>,
    /// Path of the PEM private key. `~` is expanded.
    pub key_path: Option<String>,
    /// Skip TLS certificate verification.
    pub tls_insecure: bool,
    /// Default attempts per call.
    pub attempts: Option<u32>,
    /// Timeout of one exchange.
    pub timeout: Option<Duration>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("key_id", &self.key_id)
            .field("key_path", &Redact::from(&self.key_path))
            .field("tls_insecure", &self.tls_insecure)
            .field("attempts", &self.attempts)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Load config from environment variables.
    ///
    /// `MANTA_KEY_PATH` falls back to `~/.ssh/id_rsa`. `MANTA_TIMEOUT` is in
    /// milliseconds. Malformed numbers or flags fail with `InvalidArgument`.
    pub fn from_env(ctx: &Context) -> Result<Self> {
        Ok(Self {
            url: ctx.env_var(MANTA_URL),
            user: ctx.env_var(MANTA_USER),
            key_id: ctx.env_var(MANTA_KEY_ID),
            key_path: Some(
                ctx.env_var(MANTA_KEY_PATH)
                    .unwrap_or_else(|| DEFAULT_KEY_PATH.to_string()),
            ),
            tls_insecure: parse_env::<Flag>(ctx, MANTA_TLS_INSECURE)?
                .map(|v| v.0)
                .unwrap_or_default(),
            attempts: parse_env(ctx, MANTA_ATTEMPTS)?,
            timeout: parse_env::<u64>(ctx, MANTA_TIMEOUT)?.map(Duration::from_millis),
        })
    }

    /// The key path with `~` expanded.
    pub fn expanded_key_path(&self, ctx: &Context) -> Result<Option<String>> {
        let Some(path) = &self.key_path else {
            return Ok(None);
        };
        ctx.expand_home_dir(path)
            .map(Some)
            .ok_or_else(|| Error::invalid_argument(format!("cannot expand {path}: no home dir")))
    }
}

fn parse_env<T: FromStr>(ctx: &Context, key: &str) -> Result<Option<T>> {
    let Some(v) = ctx.env_var(key) else {
        return Ok(None);
    };
    v.trim()
        .parse()
        .map(Some)
        .map_err(|_| Error::invalid_argument(format!("{key} has invalid value {v:?}")))
}

/// Boolean env flag accepting `1`/`0` and `true`/`false`.
struct Flag(bool);

impl FromStr for Flag {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(Flag(true)),
            "0" | "false" | "no" | "" => Ok(Flag(false)),
            _ => Err(()),
        }
    }
}
