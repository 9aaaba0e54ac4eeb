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

//! Hash related utils.

use crate::Error;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use md5::Digest;
use md5::Md5;

/// Base64 encode
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Base64 decode
pub fn base64_decode(content: &str) -> crate::Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(content)
        .map_err(|e| Error::unexpected("base64 decode failed").with_source(e))
}

/// Raw MD5 digest.
pub fn md5(content: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(Md5::digest(content).as_slice());
    out
}

/// Base64 encoded MD5 hash, the format used by `Content-MD5`.
pub fn base64_md5(content: &[u8]) -> String {
    base64_encode(Md5::digest(content).as_slice())
}

/// Lowercase hex bytes joined by colons.
///
/// ```shell
/// [0xb6, 0xff, 0x05] => "b6:ff:05"
/// ```
pub fn colon_hex(content: &[u8]) -> String {
    let mut s = String::with_capacity(content.len() * 3);
    for (idx, b) in content.iter().enumerate() {
        if idx != 0 {
            s.push(':');
        }
        s.push_str(&hex::encode([*b]));
    }
    s
}
