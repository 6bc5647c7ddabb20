// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flush scheduling: decides when buffered events are transmitted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::{broadcast, Notify};
use tracing::{debug, error, info, warn};

use pulse_events_core::IdentityContext;

use crate::buffer::EventBuffer;
use crate::config::{FlushBehavior, FlushPolicy};
use crate::notify::{self, EventsNotification, FlushOutcome};
use crate::transport::{DeliveryFailure, DeliveryOutcome, Transport};

/// Drives flushes from thresholds, timers, lifecycle signals, and
/// explicit requests.
///
/// A single background task (see [`FlushScheduler::run`]) performs all
/// drains, so at most one flush is in flight at a time and batches reach
/// the transport in append order. Triggers arriving mid-flush coalesce:
/// the `Notify` stores at most one permit, so any number of triggers
/// during a flush schedules exactly one follow-up.
pub struct FlushScheduler {
	buffer: Arc<EventBuffer>,
	transport: Arc<dyn Transport>,
	policy: Arc<RwLock<FlushPolicy>>,
	flush_notify: Notify,
	notifications: broadcast::Sender<EventsNotification>,
	shutdown: AtomicBool,
}

impl FlushScheduler {
	/// Creates a scheduler over the shared buffer, transport, and policy.
	pub fn new(
		buffer: Arc<EventBuffer>,
		transport: Arc<dyn Transport>,
		policy: Arc<RwLock<FlushPolicy>>,
		notifications: broadcast::Sender<EventsNotification>,
	) -> Self {
		Self {
			buffer,
			transport,
			policy,
			flush_notify: Notify::new(),
			notifications,
			shutdown: AtomicBool::new(false),
		}
	}

	fn behavior(&self) -> FlushBehavior {
		self.policy.read().unwrap_or_else(|e| e.into_inner()).behavior
	}

	fn count_threshold(&self) -> usize {
		self
			.policy
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.count_threshold
	}

	fn time_threshold(&self) -> std::time::Duration {
		self
			.policy
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.time_threshold
	}

	/// Requests a flush unconditionally, regardless of behavior.
	///
	/// Non-blocking; the background task picks up the request.
	pub fn request_flush(&self) {
		self.flush_notify.notify_one();
	}

	/// Called after a record is appended. Under automatic behavior a
	/// flush is requested when the buffered count reaches the threshold,
	/// or immediately for high-priority events such as purchases.
	pub fn on_append(&self, buffered: usize, high_priority: bool) {
		if self.behavior() == FlushBehavior::ExplicitOnly {
			return;
		}
		if high_priority || buffered >= self.count_threshold() {
			self.request_flush();
		}
	}

	/// Lifecycle signal: the app returned to the foreground, where
	/// connectivity is likely restored. Flushes regardless of behavior.
	pub fn on_became_active(&self) {
		debug!("app became active, requesting flush");
		self.request_flush();
	}

	/// Signals the scheduler to perform a final flush and stop.
	pub fn shutdown(&self) {
		self.shutdown.store(true, Ordering::SeqCst);
		self.flush_notify.notify_one();
	}

	/// Returns true if shutdown has been requested.
	pub fn is_shutdown(&self) -> bool {
		self.shutdown.load(Ordering::SeqCst)
	}

	/// Performs one drain-and-deliver cycle.
	///
	/// Returns `None` when the buffer was empty. On a transient failure
	/// the batch is restored to the buffer, order preserved; permanent
	/// failures drop the batch. Either way the outcome is published on
	/// the notification channel.
	pub async fn flush_once(&self) -> Option<FlushOutcome> {
		let batch = self.buffer.drain();
		if batch.is_empty() {
			return None;
		}
		let events = batch.len();
		debug!(events, "flushing event batch");

		let identity = IdentityContext::active();
		let outcome = match self.transport.deliver(&batch, &identity).await {
			DeliveryOutcome::Delivered => {
				info!(events, "event batch delivered");
				FlushOutcome::Delivered
			}
			DeliveryOutcome::Failed(DeliveryFailure::Transient { reason }) => {
				warn!(events, %reason, "transient delivery failure, restoring batch for retry");
				self.buffer.restore(batch);
				FlushOutcome::TransientFailure { reason }
			}
			DeliveryOutcome::Failed(DeliveryFailure::Permanent { reason }) => {
				error!(events, %reason, "permanent delivery failure, dropping batch");
				FlushOutcome::PermanentFailure { reason }
			}
		};

		notify::send(
			&self.notifications,
			EventsNotification::FlushCompleted {
				outcome: outcome.clone(),
				events,
			},
		);
		Some(outcome)
	}

	/// Runs the background flush loop until shutdown.
	///
	/// Ticks at the time threshold and wakes on flush requests. The
	/// shutdown path performs one final best-effort flush.
	pub async fn run(&self) {
		info!(
			count_threshold = self.count_threshold(),
			time_threshold_secs = self.time_threshold().as_secs(),
			"starting flush scheduler"
		);

		loop {
			let time_threshold = self.time_threshold();
			tokio::select! {
				_ = tokio::time::sleep(time_threshold) => {
					if self.shutdown.load(Ordering::SeqCst) {
						break;
					}
					let due = self.behavior() == FlushBehavior::Automatic
						&& !self.buffer.is_empty()
						&& self.buffer.elapsed_since_flush() >= time_threshold;
					if due {
						self.flush_once().await;
					}
				}
				_ = self.flush_notify.notified() => {
					// Shutdown also lands here so the last batch goes
					// out before the loop stops.
					self.flush_once().await;
					if self.shutdown.load(Ordering::SeqCst) {
						break;
					}
				}
			}
		}

		info!("flush scheduler stopped");
	}
}
