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

//! Manta object store and job service client.
//!
//! Every request is signed with an RSA or DSA key using HTTP signature
//! authentication, retried on transient failures, and checked for integrity
//! before it is handed back.
//!
//! ## Example
//!
//! ```no_run
//! use manta::{Client, Config, RequestOptions};
//! use manta_core::{Context, OsEnv};
//! use manta_file_read_tokio::TokioFileRead;
//! use manta_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> manta_core::Result<()> {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     let config = Config::from_env(&ctx)?;
//!     let client = Client::from_config(ctx, config).await?;
//!
//!     for entry in client.ls(&format!("/{}/stor", client.user())).await? {
//!         println!("{}", entry.name);
//!     }
//!
//!     let url = client.sign_url("/alice/stor/a.txt", &["GET"], 1_700_000_000i64, &[])?;
//!     println!("https://{url}");
//!     Ok(())
//! }
//! ```

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::{Credential, SigningAlgorithm};

mod sign_request;
pub use sign_request::RequestSigner;

mod options;
pub use options::{RequestOptions, Timestamp};

mod headers;
pub use headers::{HeaderAssembler, HeaderSet};

mod retry;
pub use retry::RetryPolicy;

pub mod response;

pub mod paths;

mod signed_url;
pub use signed_url::{Expires, UrlSigner};

mod types;
pub use types::{DirEntry, EntryKind, Object, ObjectMetadata, PutObjectOptions};

mod provide_credential;
pub use provide_credential::*;

mod client;
pub use client::{Client, RequestSpec};
