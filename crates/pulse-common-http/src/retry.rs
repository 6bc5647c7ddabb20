// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Retry logic with bounded exponential backoff for transient failures.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Trait for errors that can classify themselves as retryable.
///
/// Transient failures (connection refused, timeouts, 5xx responses) are
/// worth retrying; permanent failures (bad request, auth rejection) are
/// not.
pub trait RetryableError {
	/// Returns true if the operation that produced this error is worth
	/// retrying.
	fn is_retryable(&self) -> bool;
}

impl RetryableError for reqwest::Error {
	fn is_retryable(&self) -> bool {
		if self.is_timeout() || self.is_connect() {
			return true;
		}
		self
			.status()
			.map(|s| matches!(s.as_u16(), 429 | 408 | 500 | 502 | 503 | 504))
			.unwrap_or(false)
	}
}

/// Configuration for exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Maximum number of attempts, including the first.
	pub max_attempts: u32,
	/// Delay before the first retry.
	pub base_delay: Duration,
	/// Multiplier applied to the delay after each attempt.
	pub multiplier: f64,
	/// Ceiling on any single delay.
	pub max_delay: Duration,
	/// Apply full jitter: each delay is drawn uniformly from zero to the
	/// computed backoff.
	pub jitter: bool,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_millis(500),
			multiplier: 2.0,
			max_delay: Duration::from_secs(30),
			jitter: true,
		}
	}
}

impl RetryConfig {
	/// Returns the backoff delay for a given zero-based retry index,
	/// before jitter.
	pub fn delay_for(&self, retry: u32) -> Duration {
		let backoff = self.base_delay.as_secs_f64() * self.multiplier.powi(retry as i32);
		Duration::from_secs_f64(backoff.min(self.max_delay.as_secs_f64()))
	}

	fn sleep_for(&self, retry: u32) -> Duration {
		let delay = self.delay_for(retry);
		if self.jitter {
			delay.mul_f64(fastrand::f64())
		} else {
			delay
		}
	}
}

/// Runs `operation` until it succeeds, fails with a non-retryable error,
/// or exhausts the configured attempts.
///
/// The final error is returned unchanged so callers can classify it.
pub async fn retry<T, E, F, Fut>(
	config: &RetryConfig,
	operation_name: &str,
	mut operation: F,
) -> Result<T, E>
where
	E: RetryableError + std::fmt::Display,
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
{
	let mut attempt = 0;
	loop {
		match operation().await {
			Ok(value) => {
				if attempt > 0 {
					debug!(operation = operation_name, attempt, "operation succeeded after retry");
				}
				return Ok(value);
			}
			Err(err) => {
				attempt += 1;
				if attempt >= config.max_attempts || !err.is_retryable() {
					return Err(err);
				}
				let delay = config.sleep_for(attempt - 1);
				warn!(
					operation = operation_name,
					attempt,
					max_attempts = config.max_attempts,
					delay_ms = delay.as_millis() as u64,
					error = %err,
					"retrying after transient failure"
				);
				tokio::time::sleep(delay).await;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicU32, Ordering};

	#[derive(Debug, thiserror::Error)]
	enum TestError {
		#[error("transient")]
		Transient,
		#[error("permanent")]
		Permanent,
	}

	impl RetryableError for TestError {
		fn is_retryable(&self) -> bool {
			matches!(self, TestError::Transient)
		}
	}

	fn fast_config() -> RetryConfig {
		RetryConfig {
			max_attempts: 3,
			base_delay: Duration::from_millis(1),
			multiplier: 2.0,
			max_delay: Duration::from_millis(10),
			jitter: false,
		}
	}

	#[test]
	fn delay_grows_exponentially_and_caps() {
		let config = RetryConfig {
			max_attempts: 10,
			base_delay: Duration::from_millis(500),
			multiplier: 2.0,
			max_delay: Duration::from_secs(30),
			jitter: false,
		};
		assert_eq!(config.delay_for(0), Duration::from_millis(500));
		assert_eq!(config.delay_for(1), Duration::from_secs(1));
		assert_eq!(config.delay_for(2), Duration::from_secs(2));
		assert_eq!(config.delay_for(20), Duration::from_secs(30));
	}

	#[tokio::test]
	async fn succeeds_first_try() {
		let calls = AtomicU32::new(0);
		let result: Result<u32, TestError> = retry(&fast_config(), "test", || {
			calls.fetch_add(1, Ordering::SeqCst);
			async { Ok(7) }
		})
		.await;
		assert_eq!(result.unwrap(), 7);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn retries_transient_then_succeeds() {
		let calls = AtomicU32::new(0);
		let result: Result<u32, TestError> = retry(&fast_config(), "test", || {
			let n = calls.fetch_add(1, Ordering::SeqCst);
			async move {
				if n < 2 {
					Err(TestError::Transient)
				} else {
					Ok(42)
				}
			}
		})
		.await;
		assert_eq!(result.unwrap(), 42);
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn gives_up_after_max_attempts() {
		let calls = AtomicU32::new(0);
		let result: Result<u32, TestError> = retry(&fast_config(), "test", || {
			calls.fetch_add(1, Ordering::SeqCst);
			async { Err(TestError::Transient) }
		})
		.await;
		assert!(matches!(result, Err(TestError::Transient)));
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn permanent_error_fails_immediately() {
		let calls = AtomicU32::new(0);
		let result: Result<u32, TestError> = retry(&fast_config(), "test", || {
			calls.fetch_add(1, Ordering::SeqCst);
			async { Err(TestError::Permanent) }
		})
		.await;
		assert!(matches!(result, Err(TestError::Permanent)));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}
}
