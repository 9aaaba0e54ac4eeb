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

//! Time related utils.

use crate::Error;
use chrono::Utc;

/// DateTime in UTC, the only time type used across manta.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into HTTP date: "Sun, 06 Nov 1994 08:49:37 GMT"
///
/// ## Note
///
/// HTTP date is slightly different from RFC2822.
///
/// - Timezone is fixed to GMT.
/// - Day must be 2 digit.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse time from RFC2822.
///
/// All these examples are valid RFC2822, including HTTP dates:
///
/// - `Sat, 13 Jul 2024 15:09:59 -0400`
/// - `Mon, 15 Aug 2022 16:50:12 GMT`
pub fn parse_rfc2822(s: &str) -> crate::Result<DateTime> {
    let dt = chrono::DateTime::parse_from_rfc2822(s).map_err(|e| {
        Error::invalid_argument(format!("parse '{s}' into rfc2822 failed")).with_source(e)
    })?;
    Ok(dt.with_timezone(&Utc))
}

/// Parse time from RFC3339.
///
/// All these examples are valid RFC3339:
///
/// - `2022-03-13T07:20:04Z`
/// - `2022-03-01T08:12:34+00:00`
/// - `2022-03-01T08:12:34.00+00:00`
pub fn parse_rfc3339(s: &str) -> crate::Result<DateTime> {
    let dt = chrono::DateTime::parse_from_rfc3339(s).map_err(|e| {
        Error::invalid_argument(format!("parse '{s}' into rfc3339 failed")).with_source(e)
    })?;
    Ok(dt.with_timezone(&Utc))
}

/// Parse a timestamp written either as an HTTP date or as RFC3339.
pub fn parse_timestamp(s: &str) -> crate::Result<DateTime> {
    parse_rfc2822(s).or_else(|_| parse_rfc3339(s)).map_err(|_| {
        Error::invalid_argument(format!("'{s}' is neither an HTTP date nor an RFC3339 time"))
    })
}
