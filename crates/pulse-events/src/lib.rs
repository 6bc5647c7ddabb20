// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client-side event logging SDK for Pulse app analytics.
//!
//! Events are not sent when logged. They are buffered and flushed to the
//! collection endpoint when a count threshold is passed (100 logged
//! events), when a time threshold is passed (60 seconds), when the app
//! returns to the foreground, or on an explicit [`EventLogger::flush`].
//! Events accumulate while offline and go out once connectivity returns
//! and a flush condition fires.
//!
//! Logging is thread-safe: events may be logged from any of the app's
//! threads, and no logging call blocks on the network. Set
//! [`FlushBehavior::ExplicitOnly`] to flush only on explicit `flush`
//! calls.
//!
//! ```no_run
//! use pulse_events::{EventLogger, EventOptions, FlushPolicy, HttpTransport};
//! use pulse_events_core::Parameters;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let transport = Arc::new(HttpTransport::new("https://collect.example.com/events"));
//! let logger = EventLogger::new(FlushPolicy::default(), transport);
//!
//! logger.log_event("viewed_content");
//! logger.log_event_with(
//!     "rated",
//!     EventOptions::new()
//!         .value_to_sum(4.0)
//!         .parameters(Parameters::new().insert("max_rating_value", "5")),
//! );
//! logger.log_purchase(9.99, "USD");
//! # }
//! ```

mod buffer;
mod config;
mod error;
mod logger;
mod notify;
mod persist;
mod scheduler;
mod transport;

pub use buffer::EventBuffer;
pub use config::{FlushBehavior, FlushPolicy};
pub use error::{EventsError, Result};
pub use logger::{global, init_global, EventLogger, EventOptions};
pub use notify::{EventsNotification, FlushOutcome};
pub use persist::SnapshotStore;
pub use scheduler::FlushScheduler;
pub use transport::{DeliveryFailure, DeliveryOutcome, HttpTransport, Transport};

pub use pulse_events_core::{
	names, EventBatch, EventName, EventRecord, EventValidationError, IdentityContext, ParamValue,
	Parameters, UsageRegistry,
};
