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
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED};
use http::HeaderMap;
use manta_core::time::{parse_rfc2822, DateTime};
use serde::{Deserialize, Serialize};

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A directory.
    Directory,
    /// An object.
    Object,
}

/// One record of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name, relative to the listed directory.
    pub name: String,
    /// Directory or object.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<String>,
    /// Object etag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Object size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Number of copies kept of an object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durability: Option<u32>,
}

impl DirEntry {
    /// Whether this entry is a directory.
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Metadata of an object, taken from response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// `Content-Type`.
    pub content_type: Option<String>,
    /// `Content-Length`.
    pub content_length: Option<u64>,
    /// `Content-MD5`, base64.
    pub content_md5: Option<String>,
    /// `ETag`.
    pub etag: Option<String>,
    /// `Last-Modified`.
    pub last_modified: Option<DateTime>,
    /// `Durability-Level`.
    pub durability_level: Option<u32>,
}

impl ObjectMetadata {
    /// Collect metadata from response headers. Unparsable values are dropped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Self {
            content_type: text(CONTENT_TYPE.as_str()),
            content_length: text(CONTENT_LENGTH.as_str()).and_then(|v| v.parse().ok()),
            content_md5: text(CONTENT_MD5),
            etag: text(ETAG.as_str()),
            last_modified: text(LAST_MODIFIED.as_str()).and_then(|v| parse_rfc2822(&v).ok()),
            durability_level: text(DURABILITY_LEVEL).and_then(|v| v.parse().ok()),
        }
    }

    /// Whether the path is a directory rather than an object.
    pub fn is_directory(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|v| v.starts_with(CONTENT_TYPE_DIRECTORY))
    }
}

/// An object with its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    /// Metadata from response headers.
    pub metadata: ObjectMetadata,
    /// The body, empty for `HEAD`.
    pub body: Bytes,
}

/// Options for storing an object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutObjectOptions {
    /// `Content-Type`, `application/octet-stream` when unset.
    pub content_type: Option<String>,
    /// `Durability-Level`, the number of copies to keep.
    pub durability_level: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dir_entry() -> serde_json::Result<()> {
        let entry: DirEntry = serde_json::from_str(
            r#"{"name":"a.txt","etag":"e1","size":5,"type":"object","mtime":"2022-08-15T16:50:12.000Z","durability":2}"#,
        )?;
        assert_eq!(entry.kind, EntryKind::Object);
        assert_eq!(entry.size, Some(5));
        assert!(!entry.is_directory());

        let entry: DirEntry =
            serde_json::from_str(r#"{"name":"d","type":"directory","mtime":"2022-08-15T16:50:12.000Z"}"#)?;
        assert!(entry.is_directory());
        assert_eq!(entry.etag, None);
        Ok(())
    }

    #[test]
    fn test_object_metadata() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "text/plain".parse().unwrap());
        headers.insert(CONTENT_LENGTH, "5".parse().unwrap());
        headers.insert(ETAG, "e1".parse().unwrap());
        headers.insert(LAST_MODIFIED, "Mon, 15 Aug 2022 16:50:12 GMT".parse().unwrap());
        headers.insert(DURABILITY_LEVEL, "2".parse().unwrap());

        let meta = ObjectMetadata::from_headers(&headers);
        assert_eq!(meta.content_type.as_deref(), Some("text/plain"));
        assert_eq!(meta.content_length, Some(5));
        assert_eq!(meta.etag.as_deref(), Some("e1"));
        assert!(meta.last_modified.is_some());
        assert_eq!(meta.durability_level, Some(2));
        assert!(!meta.is_directory());
    }
}
