// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Validation errors for event construction.

use thiserror::Error;

/// Errors raised by local, synchronous event validation.
///
/// None of these involve the network. The SDK reports them through the
/// notification channel and tracing rather than propagating them into the
/// host application's control flow.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventValidationError {
	/// Event name violates the length or character-set rule.
	#[error("invalid event name {name:?}: names must be 2-40 characters of alphanumerics, '_', '-', or space")]
	InvalidName { name: String },

	/// A parameter key violates the same rule as event names.
	#[error("invalid parameter key {key:?}: keys must be 2-40 characters of alphanumerics, '_', '-', or space")]
	InvalidParameterKey { key: String },

	/// A string parameter value exceeds the length ceiling.
	#[error("value for parameter {key:?} is {len} characters, limit is {limit}")]
	ParameterValueTooLong { key: String, len: usize, limit: usize },

	/// The app has already used its full budget of distinct event names.
	#[error("event name {name:?} rejected: app already uses {limit} distinct event names")]
	TooManyUniqueNames { name: String, limit: usize },

	/// Logging this event would push the cumulative distinct parameter
	/// keys for its name past the ceiling.
	#[error("event {name:?} rejected: would exceed {limit} distinct parameter keys for this event name")]
	TooManyParameterKeys { name: String, limit: usize },
}
