// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Observability notifications for flush outcomes and rejected events.
//!
//! The SDK never surfaces errors into the host application's control
//! flow; this broadcast channel is the externally observable signal for
//! delivery results and validation rejections. Sends are lossy when no
//! subscriber is listening and never block the flush path.

use tokio::sync::broadcast;

/// Channel capacity; slow subscribers miss old notifications rather
/// than applying backpressure to the logger.
pub(crate) const NOTIFICATION_CAPACITY: usize = 64;

/// The result of one flush attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
	/// The batch reached the collection endpoint.
	Delivered,
	/// Delivery failed for a transient reason; the batch was restored to
	/// the buffer and will be retried on the next flush trigger.
	TransientFailure { reason: String },
	/// Delivery failed permanently; the batch was dropped.
	PermanentFailure { reason: String },
}

/// Notification emitted on the logger's broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventsNotification {
	/// A flush attempt completed with the given outcome.
	FlushCompleted { outcome: FlushOutcome, events: usize },
	/// A record failed local validation and was not buffered.
	EventRejected { name: String, reason: String },
}

pub(crate) fn channel() -> broadcast::Sender<EventsNotification> {
	broadcast::channel(NOTIFICATION_CAPACITY).0
}

/// Sends a notification, ignoring the absence of subscribers.
pub(crate) fn send(tx: &broadcast::Sender<EventsNotification>, notification: EventsNotification) {
	let _ = tx.send(notification);
}
