// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Delivery of event batches to the collection endpoint.

use std::time::Duration;

use async_trait::async_trait;
use pulse_common_http::{retry, RetryConfig, RetryableError};
use thiserror::Error;
use tracing::debug;

use pulse_events_core::{EventBatch, IdentityContext};

/// Why a delivery attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFailure {
	/// Network or server unavailable; the batch should be restored to
	/// the buffer and retried on a later flush.
	Transient { reason: String },
	/// The endpoint rejected the batch (malformed payload, auth
	/// rejection); retrying cannot help and the batch is dropped.
	Permanent { reason: String },
}

impl DeliveryFailure {
	/// Returns the failure reason.
	pub fn reason(&self) -> &str {
		match self {
			DeliveryFailure::Transient { reason } => reason,
			DeliveryFailure::Permanent { reason } => reason,
		}
	}
}

/// The result of handing a batch to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
	/// The batch reached the endpoint.
	Delivered,
	/// The attempt failed; see [`DeliveryFailure`] for retryability.
	Failed(DeliveryFailure),
}

/// Hands a batch of events to the remote collection endpoint.
///
/// The transport owns its own deadline: it reports failure after its
/// internal retries and timeout rather than blocking a flush forever.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Attempts delivery of `batch` attributed to `identity`.
	async fn deliver(&self, batch: &EventBatch, identity: &IdentityContext) -> DeliveryOutcome;
}

#[derive(Debug, Error)]
enum HttpDeliveryError {
	#[error("request failed: {0}")]
	Request(#[from] reqwest::Error),

	#[error("server error ({status}): {message}")]
	Server { status: u16, message: String },
}

impl RetryableError for HttpDeliveryError {
	fn is_retryable(&self) -> bool {
		match self {
			HttpDeliveryError::Request(e) => e.is_retryable(),
			HttpDeliveryError::Server { status, .. } => {
				matches!(*status, 429 | 408 | 500 | 502 | 503 | 504)
			}
		}
	}
}

/// HTTP transport: POSTs the batch as JSON to a collection endpoint.
///
/// Transient failures are retried with bounded exponential backoff
/// inside a single `deliver` call; once attempts are exhausted the
/// failure is reported so the scheduler can restore the batch.
pub struct HttpTransport {
	client: reqwest::Client,
	endpoint: String,
	retry_config: RetryConfig,
}

impl HttpTransport {
	/// Request timeout for a single delivery attempt.
	const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

	/// Creates a transport targeting the given collection endpoint.
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			client: pulse_common_http::new_client_with_timeout(Self::REQUEST_TIMEOUT),
			endpoint: endpoint.into(),
			retry_config: RetryConfig::default(),
		}
	}

	/// Overrides the retry configuration.
	pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
		self.retry_config = retry_config;
		self
	}

	async fn post_batch(
		&self,
		batch: &EventBatch,
		identity: &IdentityContext,
	) -> Result<(), HttpDeliveryError> {
		let payload = serde_json::json!({
			"identity": identity,
			"events": batch.records(),
		});
		let response = self
			.client
			.post(&self.endpoint)
			.json(&payload)
			.send()
			.await?;

		let status = response.status();
		if status.is_success() {
			return Ok(());
		}
		let message = response.text().await.unwrap_or_default();
		Err(HttpDeliveryError::Server {
			status: status.as_u16(),
			message: message.chars().take(200).collect(),
		})
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn deliver(&self, batch: &EventBatch, identity: &IdentityContext) -> DeliveryOutcome {
		let result = retry(&self.retry_config, "deliver event batch", || {
			self.post_batch(batch, identity)
		})
		.await;

		match result {
			Ok(()) => {
				debug!(events = batch.len(), endpoint = %self.endpoint, "batch delivered");
				DeliveryOutcome::Delivered
			}
			Err(err) if err.is_retryable() => DeliveryOutcome::Failed(DeliveryFailure::Transient {
				reason: err.to_string(),
			}),
			Err(err) => DeliveryOutcome::Failed(DeliveryFailure::Permanent {
				reason: err.to_string(),
			}),
		}
	}
}
