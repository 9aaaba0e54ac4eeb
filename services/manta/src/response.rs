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

//! Response interpretation: status, content type, integrity and error mapping.

use crate::constants::*;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Response, StatusCode};
use log::debug;
use manta_core::hash::base64_md5;
use manta_core::{Error, ErrorKind, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Interpret a response against the success codes of an operation.
///
/// - `304 Not Modified` returns `Ok(None)`.
/// - An expected status returns the response once its `Content-MD5` checks out.
/// - Everything else becomes an error through [`error_from_response`].
pub fn interpret(
    method: &Method,
    resp: Response<Bytes>,
    expected: &[StatusCode],
) -> Result<Option<Response<Bytes>>> {
    let status = resp.status();
    if status == StatusCode::NOT_MODIFIED {
        debug!("{method} returned 304, nothing new");
        return Ok(None);
    }
    if !expected.contains(&status) {
        return Err(error_from_response(&resp));
    }

    if *method != Method::HEAD {
        verify_content_md5(&resp)?;
    }
    Ok(Some(resp))
}

/// Compare `Content-MD5` with the digest of the body.
///
/// Responses without the header pass.
pub fn verify_content_md5(resp: &Response<Bytes>) -> Result<()> {
    let Some(expected) = resp.headers().get(CONTENT_MD5) else {
        return Ok(());
    };
    let expected = expected
        .to_str()
        .map_err(|e| Error::corrupt_result("content-md5 is not valid text").with_source(e))?;

    let actual = base64_md5(resp.body());
    if actual != expected {
        return Err(Error::corrupt_result(format!(
            "content-md5 mismatch: expected {expected}, got {actual}"
        )));
    }
    Ok(())
}

/// Check the media type of a response, ignoring parameters.
///
/// A mismatch is an `UnknownError` that keeps the status and body.
pub fn check_content_type(resp: &Response<Bytes>, expected: &str) -> Result<()> {
    let actual = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let media_type = actual.split(';').next().unwrap_or_default().trim();

    if media_type.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(Error::new(
            ErrorKind::UnknownError,
            format!("expected content type {expected}, got {actual:?}"),
        )
        .with_status(resp.status())
        .with_body(String::from_utf8_lossy(resp.body())))
    }
}

/// Decode an `application/json` body.
pub fn parse_json<T: DeserializeOwned>(resp: &Response<Bytes>) -> Result<T> {
    check_content_type(resp, CONTENT_TYPE_JSON)?;
    serde_json::from_slice(resp.body())
        .map_err(|e| Error::corrupt_result("response body is not valid json").with_source(e))
}

/// Decode an `application/x-json-stream` body, one record per line.
///
/// When the response carries `Result-Set-Size` the record count must equal
/// it, and it must never exceed `limit`.
pub fn parse_json_stream<T: DeserializeOwned>(
    resp: &Response<Bytes>,
    limit: Option<usize>,
) -> Result<Vec<T>> {
    check_content_type(resp, CONTENT_TYPE_JSON_STREAM)?;

    let body = std::str::from_utf8(resp.body())
        .map_err(|e| Error::corrupt_result("response body is not utf-8").with_source(e))?;
    let mut records = Vec::new();
    for (idx, line) in body.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|e| {
            Error::corrupt_result(format!("record at line {} is not valid json", idx + 1))
                .with_source(e)
        })?;
        records.push(record);
    }

    if let Some(size) = result_set_size(resp)? {
        if size != records.len() {
            return Err(Error::corrupt_result(format!(
                "result-set-size is {size} but {} records were returned",
                records.len()
            )));
        }
    }
    if let Some(limit) = limit {
        if records.len() > limit {
            return Err(Error::corrupt_result(format!(
                "limit is {limit} but {} records were returned",
                records.len()
            )));
        }
    }
    Ok(records)
}

fn result_set_size(resp: &Response<Bytes>) -> Result<Option<usize>> {
    let Some(v) = resp.headers().get(RESULT_SET_SIZE) else {
        return Ok(None);
    };
    v.to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .map(Some)
        .ok_or_else(|| Error::corrupt_result("result-set-size is not a number"))
}

/// Decode a `text/plain` body into its non-empty lines.
pub fn parse_lines(resp: &Response<Bytes>) -> Result<Vec<String>> {
    check_content_type(resp, CONTENT_TYPE_TEXT)?;
    let body = std::str::from_utf8(resp.body())
        .map_err(|e| Error::corrupt_result("response body is not utf-8").with_source(e))?;
    Ok(body
        .lines()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect())
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Map an unsuccessful response onto the error taxonomy.
///
/// `412` is always `PreconditionFailed`. Otherwise a JSON body with a known
/// `code` maps to that kind, and anything else is an `UnknownError` carrying
/// the raw status and body.
pub fn error_from_response(resp: &Response<Bytes>) -> Error {
    let status = resp.status();
    let body = String::from_utf8_lossy(resp.body()).into_owned();
    debug!("service returned {status}: {body}");

    let parsed = serde_json::from_str::<ErrorBody>(&body).ok();
    let kind = parsed
        .as_ref()
        .and_then(|v| ErrorKind::from_code(&v.code));

    match (status, kind, parsed) {
        (StatusCode::PRECONDITION_FAILED, _, parsed) => Error::new(
            ErrorKind::PreconditionFailed,
            parsed
                .map(|v| v.message)
                .unwrap_or_else(|| "precondition failed".to_string()),
        )
        .with_status(status)
        .with_body(body),
        (_, Some(kind), Some(parsed)) => Error::new(kind, parsed.message)
            .with_status(status)
            .with_body(body),
        _ => Error::unknown(status, body),
    }
}
