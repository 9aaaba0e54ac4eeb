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

//! Core components for the manta client.
//!
//! This crate provides the foundational types shared by the manta workspace:
//!
//! - **Error**: the closed [`ErrorKind`] taxonomy covering both the service's error
//!   codes and local failures, with the transient/terminal split used for retries.
//! - **Context**: a container that holds implementations for HTTP sending, file
//!   reading, and environment access.
//! - **ProvideCredential**: the seam through which a client obtains its signing
//!   credential.
//!
//! ## Traits
//!
//! - [`HttpSend`]: For sending HTTP requests
//! - [`FileRead`]: For asynchronous file reading
//! - [`Env`]: For environment variable access
//! - [`ProvideCredential`]: For loading credentials from various sources
//!
//! ## Utilities
//!
//! - [`hash`]: MD5 and base64 helpers
//! - [`time`]: HTTP date handling
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
pub use context::Env;
pub use context::FileRead;
pub use context::HttpSend;
pub use context::NoopEnv;
pub use context::NoopFileRead;
pub use context::NoopHttpSend;
pub use context::OsEnv;
pub use context::StaticEnv;

mod api;
pub use api::ProvideCredential;

mod error;
pub use error::{Error, ErrorKind, Result};
