// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flush policy configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Controls when buffered events are sent to the collection endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushBehavior {
	/// Flush automatically: when the count threshold is passed, when the
	/// time threshold is passed, and at app reactivation.
	Automatic,
	/// Only flush on an explicit `flush` call. Events still persist
	/// across background/terminate and are re-established at activation,
	/// but go out only when `flush` is called.
	ExplicitOnly,
}

impl Default for FlushBehavior {
	fn default() -> Self {
		FlushBehavior::Automatic
	}
}

/// Configuration for event buffering and flush scheduling.
#[derive(Debug, Clone)]
pub struct FlushPolicy {
	/// When automatic flushing happens.
	pub behavior: FlushBehavior,
	/// Buffered-event count that triggers an automatic flush.
	pub count_threshold: usize,
	/// Elapsed time since the last flush that triggers an automatic
	/// flush of a non-empty buffer.
	pub time_threshold: Duration,
	/// Ceiling on buffered events while offline; oldest records are
	/// dropped past this point.
	pub max_buffered: usize,
}

impl Default for FlushPolicy {
	fn default() -> Self {
		Self {
			behavior: FlushBehavior::default(),
			count_threshold: 100,
			time_threshold: Duration::from_secs(60),
			max_buffered: 10_000,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_documented_thresholds() {
		let policy = FlushPolicy::default();
		assert_eq!(policy.behavior, FlushBehavior::Automatic);
		assert_eq!(policy.count_threshold, 100);
		assert_eq!(policy.time_threshold, Duration::from_secs(60));
		assert_eq!(policy.max_buffered, 10_000);
	}

	#[test]
	fn behavior_serde() {
		let json = serde_json::to_string(&FlushBehavior::ExplicitOnly).unwrap();
		assert_eq!(json, "\"explicit_only\"");
		let parsed: FlushBehavior = serde_json::from_str("\"automatic\"").unwrap();
		assert_eq!(parsed, FlushBehavior::Automatic);
	}
}
