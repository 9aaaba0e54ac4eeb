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

use log::warn;
use manta_core::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Bounded retry with exponential backoff.
///
/// Before retry `n` (counting from 1) the calling task sleeps `2^n` seconds.
/// Only transient errors (`ConnectionRefused`, `Timeout`, `CorruptResult`)
/// are retried; the last one is returned unchanged once attempts run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// Create a policy, failing with `InvalidArgument` when `attempts` is zero.
    pub fn new(attempts: u32) -> Result<Self> {
        if attempts == 0 {
            return Err(Error::invalid_argument("attempts must be positive"));
        }
        Ok(Self {
            max_attempts: attempts,
        })
    }

    /// Maximum number of exchanges.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry `n`.
    pub fn backoff(&self, n: u32) -> Duration {
        Duration::from_secs(2u64.saturating_pow(n))
    }

    /// Run `op` until it succeeds, fails for good, or attempts run out.
    ///
    /// `op` receives the zero based attempt index.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(v) => return Ok(v),
                Err(err) if err.is_transient() && attempt + 1 < self.max_attempts => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    warn!(
                        "attempt {attempt}/{} failed: {err}, retrying in {delay:?}",
                        self.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: crate::constants::DEFAULT_ATTEMPTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manta_core::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_zero_attempts() {
        let err = RetryPolicy::new(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_exhausts_attempts() {
        let calls = &AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let res: Result<()> = RetryPolicy::new(3)
            .unwrap()
            .run(|_| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::timeout("request timed out"))
            })
            .await;

        assert_eq!(res.unwrap_err().kind(), ErrorKind::Timeout);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 2s before the second attempt and 4s before the third.
        assert!(start.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_is_not_retried() {
        let calls = &AtomicU32::new(0);

        let res: Result<()> = RetryPolicy::new(3)
            .unwrap()
            .run(|_| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::new(ErrorKind::ResourceNotFound, "not found"))
            })
            .await;

        assert_eq!(res.unwrap_err().kind(), ErrorKind::ResourceNotFound);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_retry() -> Result<()> {
        let v = RetryPolicy::new(3)?
            .run(|attempt| async move {
                if attempt == 0 {
                    Err(Error::corrupt_result("content-md5 mismatch"))
                } else {
                    Ok(attempt)
                }
            })
            .await?;
        assert_eq!(v, 1);
        Ok(())
    }
}
