// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bounded retry for transient backend failures.

use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::error::AppError;

/// Retry transient errors a fixed number of times with a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 1,
            delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            retries: config.retry_attempts,
            delay: config.retry_delay,
        }
    }

    pub fn none() -> Self {
        Self {
            retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// Run `call`, retrying only errors for which [`AppError::is_transient`] holds.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(
                        operation,
                        attempt,
                        error = %err,
                        "Transient backend failure, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
