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

//! Path shape checks, run before a request is built.

use manta_core::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static STORE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/[^/]+/(stor|public)(/.*)?$").expect("store path regex must be valid")
});

static PRIVATE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/[^/]+/stor(/.*)?$").expect("private path regex must be valid"));

static JOB_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/[^/]+/jobs/[^/]+$").expect("job path regex must be valid"));

/// `/<login>/stor[/...]` or `/<login>/public[/...]`.
pub fn validate_store_path(path: &str) -> Result<()> {
    if STORE_PATH.is_match(path) {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "{path} is not of the form /<login>/(stor|public)[/...]"
        )))
    }
}

/// `/<login>/stor[/...]`, the only namespace signed urls may point into.
pub fn validate_private_path(path: &str) -> Result<()> {
    if PRIVATE_PATH.is_match(path) {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "{path} is not of the form /<login>/stor[/...]"
        )))
    }
}

/// `/<login>/jobs/<id>`.
pub fn validate_job_path(path: &str) -> Result<()> {
    if JOB_PATH.is_match(path) {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "{path} is not of the form /<login>/jobs/<id>"
        )))
    }
}

/// Strip trailing slashes, keeping a lone `/`.
pub fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}
