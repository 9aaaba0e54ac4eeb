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

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Env values used in manta.
pub const MANTA_URL: &str = "MANTA_URL";
pub const MANTA_USER: &str = "MANTA_USER";
pub const MANTA_KEY_ID: &str = "MANTA_KEY_ID";
pub const MANTA_KEY_PATH: &str = "MANTA_KEY_PATH";
pub const MANTA_TLS_INSECURE: &str = "MANTA_TLS_INSECURE";
pub const MANTA_ATTEMPTS: &str = "MANTA_ATTEMPTS";
pub const MANTA_TIMEOUT: &str = "MANTA_TIMEOUT";

/// Key used when `MANTA_KEY_PATH` is not set.
pub const DEFAULT_KEY_PATH: &str = "~/.ssh/id_rsa";
/// Default number of attempts for one logical call.
pub const DEFAULT_ATTEMPTS: u32 = 3;

pub const USER_AGENT: &str = concat!("manta-rs/", env!("CARGO_PKG_VERSION"));
pub const API_VERSION: &str = "~1.0";

// Headers used in manta.
pub const ACCEPT_VERSION: &str = "accept-version";
pub const DURABILITY_LEVEL: &str = "durability-level";
pub const RESULT_SET_SIZE: &str = "result-set-size";
pub const CONTENT_MD5: &str = "content-md5";

// Content types used in manta.
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_JSON_STREAM: &str = "application/x-json-stream";
pub const CONTENT_TYPE_DIRECTORY: &str = "application/json; type=directory";
pub const CONTENT_TYPE_LINK: &str = "application/json; type=link";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";
pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// Methods allowed in `access-control-allow-methods`.
pub const CORS_METHODS: [&str; 5] = ["GET", "POST", "PUT", "DELETE", "OPTIONS"];

/// Methods a signed url may grant.
pub const SIGNED_URL_METHODS: [&str; 6] = ["DELETE", "GET", "HEAD", "OPTIONS", "POST", "PUT"];

/// AsciiSet for query keys and values in signed urls.
///
/// Everything except RFC 3986 unreserved characters is escaped.
pub static MANTA_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// AsciiSet for paths, same as the query set but `/` is kept.
pub static MANTA_PATH_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
