// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process-wide usage ceilings for event names and parameter keys.
//!
//! The collection endpoint bounds how many distinct event names an app
//! may use, and how many distinct parameter keys may accumulate per event
//! name across the app's lifetime. The registry enforces both ceilings
//! locally so over-budget events are rejected before they ever buffer.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::EventValidationError;
use crate::event::EventName;

/// Ceiling on distinct event names used by one app.
pub const MAX_UNIQUE_EVENT_NAMES: usize = 300;
/// Ceiling on cumulative distinct parameter keys per event name.
pub const MAX_PARAM_KEYS_PER_EVENT: usize = 25;

/// Tracks distinct event names and, per name, the cumulative set of
/// distinct parameter keys ever logged with it.
#[derive(Debug)]
pub struct UsageRegistry {
	max_unique_names: usize,
	max_param_keys: usize,
	seen: Mutex<HashMap<EventName, HashSet<String>>>,
}

impl UsageRegistry {
	/// Creates a registry with the standard ceilings.
	pub fn new() -> Self {
		Self::with_limits(MAX_UNIQUE_EVENT_NAMES, MAX_PARAM_KEYS_PER_EVENT)
	}

	/// Creates a registry with custom ceilings.
	pub fn with_limits(max_unique_names: usize, max_param_keys: usize) -> Self {
		Self {
			max_unique_names,
			max_param_keys,
			seen: Mutex::new(HashMap::new()),
		}
	}

	/// Registers an event name and its parameter keys.
	///
	/// Atomic: a rejected event registers nothing, so a failed log call
	/// does not consume budget. The key ceiling is cumulative across all
	/// records ever logged for the name, not per call.
	pub fn register<'a>(
		&self,
		name: &EventName,
		keys: impl Iterator<Item = &'a str>,
	) -> Result<(), EventValidationError> {
		let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());

		if !seen.contains_key(name) && seen.len() >= self.max_unique_names {
			return Err(EventValidationError::TooManyUniqueNames {
				name: name.as_str().to_string(),
				limit: self.max_unique_names,
			});
		}

		let existing = seen.get(name);
		let mut merged: HashSet<String> = existing.cloned().unwrap_or_default();
		for key in keys {
			merged.insert(key.to_string());
		}
		if merged.len() > self.max_param_keys {
			return Err(EventValidationError::TooManyParameterKeys {
				name: name.as_str().to_string(),
				limit: self.max_param_keys,
			});
		}

		seen.insert(name.clone(), merged);
		Ok(())
	}

	/// Returns the number of distinct event names registered so far.
	pub fn unique_names(&self) -> usize {
		self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
	}

	/// Returns the cumulative distinct parameter key count for a name.
	pub fn param_keys_for(&self, name: &EventName) -> usize {
		self.seen
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.get(name)
			.map(HashSet::len)
			.unwrap_or(0)
	}
}

impl Default for UsageRegistry {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn name(s: &str) -> EventName {
		EventName::new(s).unwrap()
	}

	#[test]
	fn register_tracks_unique_names() {
		let registry = UsageRegistry::new();
		registry.register(&name("first_event"), std::iter::empty()).unwrap();
		registry.register(&name("second_event"), std::iter::empty()).unwrap();
		registry.register(&name("first_event"), std::iter::empty()).unwrap();
		assert_eq!(registry.unique_names(), 2);
	}

	#[test]
	fn rejects_name_past_ceiling() {
		let registry = UsageRegistry::with_limits(2, 25);
		registry.register(&name("event_a"), std::iter::empty()).unwrap();
		registry.register(&name("event_b"), std::iter::empty()).unwrap();

		let err = registry
			.register(&name("event_c"), std::iter::empty())
			.unwrap_err();
		assert!(matches!(
			err,
			EventValidationError::TooManyUniqueNames { limit: 2, .. }
		));

		// Existing names are still accepted at the ceiling.
		registry.register(&name("event_a"), std::iter::empty()).unwrap();
	}

	#[test]
	fn param_key_ceiling_is_cumulative() {
		let registry = UsageRegistry::with_limits(300, 3);
		registry
			.register(&name("checkout"), ["k_one", "k_two"].into_iter())
			.unwrap();
		// Same keys again: no new budget consumed.
		registry
			.register(&name("checkout"), ["k_one", "k_two"].into_iter())
			.unwrap();
		registry
			.register(&name("checkout"), ["k_three"].into_iter())
			.unwrap();

		let err = registry
			.register(&name("checkout"), ["k_four"].into_iter())
			.unwrap_err();
		assert!(matches!(
			err,
			EventValidationError::TooManyParameterKeys { limit: 3, .. }
		));
		assert_eq!(registry.param_keys_for(&name("checkout")), 3);
	}

	#[test]
	fn rejected_event_consumes_no_budget() {
		let registry = UsageRegistry::with_limits(300, 2);
		let err = registry
			.register(&name("overloaded"), ["k_one", "k_two", "k_three"].into_iter())
			.unwrap_err();
		assert!(matches!(
			err,
			EventValidationError::TooManyParameterKeys { .. }
		));
		// Nothing registered: the name does not count against the ceiling.
		assert_eq!(registry.unique_names(), 0);
		assert_eq!(registry.param_keys_for(&name("overloaded")), 0);
	}

	#[test]
	fn keys_scoped_per_event_name() {
		let registry = UsageRegistry::with_limits(300, 2);
		registry
			.register(&name("event_a"), ["k_one", "k_two"].into_iter())
			.unwrap();
		// A different name has its own key budget.
		registry
			.register(&name("event_b"), ["k_three", "k_four"].into_iter())
			.unwrap();
	}
}
