// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The process-wide event logging facade.

use std::sync::{Arc, Mutex, OnceLock, RwLock};

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use pulse_events_core::{
	names, EventName, EventRecord, IdentityContext, Parameters, UsageRegistry,
};

use crate::buffer::EventBuffer;
use crate::config::{FlushBehavior, FlushPolicy};
use crate::error::{EventsError, Result};
use crate::notify::{self, EventsNotification};
use crate::persist::SnapshotStore;
use crate::scheduler::FlushScheduler;
use crate::transport::Transport;

/// Optional fields for a logged event.
///
/// # Example
///
/// ```no_run
/// use pulse_events::{EventOptions, Parameters};
///
/// let options = EventOptions::new()
///     .value_to_sum(4.0)
///     .parameters(Parameters::new().insert("max_rating_value", "5"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventOptions {
	value_to_sum: Option<f64>,
	parameters: Parameters,
	identity: Option<IdentityContext>,
}

impl EventOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Amount aggregated across all events sharing the event name.
	pub fn value_to_sum(mut self, value: f64) -> Self {
		self.value_to_sum = Some(value);
		self
	}

	/// Key/value segments for this event.
	pub fn parameters(mut self, parameters: Parameters) -> Self {
		self.parameters = parameters;
		self
	}

	/// Attributes the event to a specific identity instead of the
	/// process-wide active one.
	pub fn identity(mut self, identity: IdentityContext) -> Self {
		self.identity = Some(identity);
		self
	}
}

struct LoggerInner {
	buffer: Arc<EventBuffer>,
	scheduler: Arc<FlushScheduler>,
	policy: Arc<RwLock<FlushPolicy>>,
	registry: UsageRegistry,
	notifications: broadcast::Sender<EventsNotification>,
	worker: Mutex<Option<JoinHandle<()>>>,
}

/// Client-side event logger: buffers validated events and flushes them
/// to the collection endpoint per the configured [`FlushPolicy`].
///
/// Cheap to clone; all clones share one buffer and scheduler. Every
/// operation is thread-safe and returns without waiting on the network.
/// Call [`EventLogger::shutdown`] at process exit for a best-effort
/// final flush.
#[derive(Clone)]
pub struct EventLogger {
	inner: Arc<LoggerInner>,
}

impl EventLogger {
	/// Creates a logger and spawns its background flush task.
	///
	/// Must be called within a Tokio runtime.
	pub fn new(policy: FlushPolicy, transport: Arc<dyn Transport>) -> Self {
		let notifications = notify::channel();
		let buffer = Arc::new(EventBuffer::new(policy.max_buffered));
		let policy = Arc::new(RwLock::new(policy));
		let scheduler = Arc::new(FlushScheduler::new(
			Arc::clone(&buffer),
			transport,
			Arc::clone(&policy),
			notifications.clone(),
		));

		let worker = {
			let scheduler = Arc::clone(&scheduler);
			tokio::spawn(async move { scheduler.run().await })
		};

		Self {
			inner: Arc::new(LoggerInner {
				buffer,
				scheduler,
				policy,
				registry: UsageRegistry::new(),
				notifications,
				worker: Mutex::new(Some(worker)),
			}),
		}
	}

	/// Logs an event with just a name.
	///
	/// Validation failures never propagate into the caller's control
	/// flow; they are reported on the notification channel and via
	/// tracing. Use [`EventLogger::try_log_event`] to observe them.
	pub fn log_event(&self, name: &str) {
		self.log_event_with(name, EventOptions::new());
	}

	/// Logs an event with a value to sum, parameters, or an explicit
	/// identity.
	pub fn log_event_with(&self, name: &str, options: EventOptions) {
		if let Err(e) = self.log_internal(name, options, false) {
			warn!(event_name = name, error = %e, "event rejected");
			notify::send(
				&self.inner.notifications,
				EventsNotification::EventRejected {
					name: name.to_string(),
					reason: e.to_string(),
				},
			);
		}
	}

	/// Logs an event, returning validation failures to the caller.
	pub fn try_log_event(&self, name: &str, options: EventOptions) -> Result<()> {
		self.log_internal(name, options, false)
	}

	/// Logs a purchase of `amount` in the given ISO-4217 `currency`.
	///
	/// The amount is rounded to the thousandths place (12.34567 becomes
	/// 12.346). Triggers an immediate flush unless the behavior is
	/// [`FlushBehavior::ExplicitOnly`].
	pub fn log_purchase(&self, amount: f64, currency: &str) {
		self.log_purchase_with(amount, currency, Parameters::new());
	}

	/// Logs a purchase with additional parameters describing it.
	pub fn log_purchase_with(&self, amount: f64, currency: &str, parameters: Parameters) {
		let options = EventOptions::new()
			.value_to_sum(round_to_thousandths(amount))
			.parameters(parameters.insert(names::PARAM_CURRENCY, currency));
		if let Err(e) = self.log_internal(names::EVENT_PURCHASED, options, true) {
			warn!(error = %e, "purchase event rejected");
			notify::send(
				&self.inner.notifications,
				EventsNotification::EventRejected {
					name: names::EVENT_PURCHASED.to_string(),
					reason: e.to_string(),
				},
			);
		}
	}

	/// Notifies the SDK that the app has been activated: logs the
	/// predefined activated-app event and flushes, since reactivation is
	/// the point where connectivity is likely restored.
	pub fn activate_app(&self) {
		self.log_event(names::EVENT_ACTIVATED_APP);
		self.inner.scheduler.on_became_active();
	}

	/// Explicitly kicks off a flush. Asynchronous: the call returns
	/// immediately and the outcome is reported on the notification
	/// channel.
	pub fn flush(&self) {
		self.inner.scheduler.request_flush();
	}

	/// Returns the current flush behavior.
	pub fn flush_behavior(&self) -> FlushBehavior {
		self
			.inner
			.policy
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.behavior
	}

	/// Sets the flush behavior, taking effect for subsequent triggers.
	pub fn set_flush_behavior(&self, behavior: FlushBehavior) {
		self
			.inner
			.policy
			.write()
			.unwrap_or_else(|e| e.into_inner())
			.behavior = behavior;
		debug!(?behavior, "flush behavior updated");
	}

	/// Subscribes to flush outcomes and validation rejections.
	pub fn subscribe(&self) -> broadcast::Receiver<EventsNotification> {
		self.inner.notifications.subscribe()
	}

	/// Returns the number of events currently buffered.
	pub fn buffered(&self) -> usize {
		self.inner.buffer.len()
	}

	/// Lifecycle will-suspend handling: snapshots the pending buffer so
	/// events survive a background/terminate cycle. Returns the number
	/// of records persisted.
	pub fn suspend(&self, store: &SnapshotStore) -> Result<usize> {
		store.save(&self.inner.buffer)
	}

	/// Process-start handling: restores any snapshot persisted by a
	/// previous [`EventLogger::suspend`]. Returns the number of records
	/// restored.
	pub fn resume(&self, store: &SnapshotStore) -> Result<usize> {
		store.load(&self.inner.buffer)
	}

	/// Performs a best-effort final flush and stops the background task.
	pub async fn shutdown(&self) {
		self.inner.scheduler.shutdown();
		let worker = self
			.inner
			.worker
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.take();
		if let Some(worker) = worker {
			let _ = worker.await;
		}
	}

	fn log_internal(&self, name: &str, options: EventOptions, high_priority: bool) -> Result<()> {
		if self.inner.scheduler.is_shutdown() {
			return Err(EventsError::Shutdown);
		}

		let name = EventName::new(name).map_err(EventsError::Validation)?;
		options
			.parameters
			.validate()
			.map_err(EventsError::Validation)?;
		self
			.inner
			.registry
			.register(&name, options.parameters.keys())
			.map_err(EventsError::Validation)?;

		let record = EventRecord {
			name,
			timestamp: Utc::now(),
			value_to_sum: options.value_to_sum,
			parameters: options.parameters,
			identity: options.identity.unwrap_or_else(IdentityContext::active),
		};

		let buffered = self.inner.buffer.append(record);
		self.inner.scheduler.on_append(buffered, high_priority);
		Ok(())
	}
}

/// Rounds a monetary amount to the thousandths place.
fn round_to_thousandths(amount: f64) -> f64 {
	(amount * 1000.0).round() / 1000.0
}

static GLOBAL: OnceLock<EventLogger> = OnceLock::new();

/// Installs the process-wide logger used by code without a handle of its
/// own. Fails if one is already installed.
pub fn init_global(logger: EventLogger) -> Result<()> {
	GLOBAL
		.set(logger)
		.map_err(|_| EventsError::AlreadyInitialized)
}

/// Returns the process-wide logger, if one has been installed.
pub fn global() -> Option<EventLogger> {
	GLOBAL.get().cloned()
}
