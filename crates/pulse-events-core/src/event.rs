// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event records, names, parameters, and batches.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EventValidationError;
use crate::identity::IdentityContext;

/// Minimum length of an event name or parameter key, in characters.
pub const MIN_NAME_LENGTH: usize = 2;
/// Maximum length of an event name or parameter key, in characters.
pub const MAX_NAME_LENGTH: usize = 40;
/// Maximum length of a string parameter value, in characters.
pub const MAX_PARAM_VALUE_LENGTH: usize = 100;

/// Returns true if `s` is a well-formed event name or parameter key:
/// 2-40 characters, each alphanumeric, `_`, `-`, or space.
fn is_valid_token(s: &str) -> bool {
	let len = s.chars().count();
	if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&len) {
		return false;
	}
	s.chars()
		.all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ' ')
}

/// A validated event name.
///
/// Construction enforces the length and character-set rule, so holding an
/// `EventName` is proof the name is well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventName(String);

impl EventName {
	/// Validates and wraps an event name.
	pub fn new(name: impl Into<String>) -> Result<Self, EventValidationError> {
		let name = name.into();
		if !is_valid_token(&name) {
			return Err(EventValidationError::InvalidName { name });
		}
		Ok(Self(name))
	}

	/// Returns the name as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for EventName {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl AsRef<str> for EventName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl std::str::FromStr for EventName {
	type Err = EventValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

impl TryFrom<String> for EventName {
	type Error = EventValidationError;

	fn try_from(s: String) -> Result<Self, Self::Error> {
		Self::new(s)
	}
}

impl From<EventName> for String {
	fn from(name: EventName) -> Self {
		name.0
	}
}

/// A parameter value: a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
	/// String value, at most [`MAX_PARAM_VALUE_LENGTH`] characters.
	Text(String),
	/// Numeric value.
	Number(f64),
}

impl ParamValue {
	/// Returns the string value, if this is a text parameter.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			ParamValue::Text(s) => Some(s),
			ParamValue::Number(_) => None,
		}
	}

	/// Returns the numeric value, if this is a number parameter.
	pub fn as_number(&self) -> Option<f64> {
		match self {
			ParamValue::Text(_) => None,
			ParamValue::Number(n) => Some(*n),
		}
	}
}

impl From<&str> for ParamValue {
	fn from(s: &str) -> Self {
		ParamValue::Text(s.to_string())
	}
}

impl From<String> for ParamValue {
	fn from(s: String) -> Self {
		ParamValue::Text(s)
	}
}

impl From<f64> for ParamValue {
	fn from(n: f64) -> Self {
		ParamValue::Number(n)
	}
}

impl From<i64> for ParamValue {
	fn from(n: i64) -> Self {
		ParamValue::Number(n as f64)
	}
}

impl From<u32> for ParamValue {
	fn from(n: u32) -> Self {
		ParamValue::Number(f64::from(n))
	}
}

/// A builder for event parameters: unique string keys mapped to string
/// or number values.
///
/// # Example
///
/// ```
/// use pulse_events_core::Parameters;
///
/// let params = Parameters::new()
///     .insert("content_type", "music")
///     .insert("num_items", 3_i64);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
	inner: BTreeMap<String, ParamValue>,
}

impl Parameters {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self {
			inner: BTreeMap::new(),
		}
	}

	/// Inserts a key-value pair, replacing any existing value for the key.
	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<ParamValue>,
	{
		self.inner.insert(key.into(), value.into());
		self
	}

	/// Returns true if no parameters are set.
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Returns the number of parameters.
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	/// Gets a value by key.
	pub fn get(&self, key: &str) -> Option<&ParamValue> {
		self.inner.get(key)
	}

	/// Iterates over keys in sorted order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.inner.keys().map(String::as_str)
	}

	/// Iterates over key-value pairs in sorted key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
		self.inner.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Checks every key against the name rule and every string value
	/// against the length ceiling.
	pub fn validate(&self) -> Result<(), EventValidationError> {
		for (key, value) in &self.inner {
			if !is_valid_token(key) {
				return Err(EventValidationError::InvalidParameterKey { key: key.clone() });
			}
			if let ParamValue::Text(s) = value {
				let len = s.chars().count();
				if len > MAX_PARAM_VALUE_LENGTH {
					return Err(EventValidationError::ParameterValueTooLong {
						key: key.clone(),
						len,
						limit: MAX_PARAM_VALUE_LENGTH,
					});
				}
			}
		}
		Ok(())
	}
}

/// One logged occurrence. Immutable once constructed; batches copy
/// records out of the buffer, never mutate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
	pub name: EventName,
	pub timestamp: DateTime<Utc>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub value_to_sum: Option<f64>,
	#[serde(skip_serializing_if = "Parameters::is_empty", default)]
	pub parameters: Parameters,
	pub identity: IdentityContext,
}

impl EventRecord {
	/// Creates a record with the current timestamp, no value, no
	/// parameters, and the process-wide active identity.
	pub fn new(name: EventName) -> Self {
		Self {
			name,
			timestamp: Utc::now(),
			value_to_sum: None,
			parameters: Parameters::new(),
			identity: IdentityContext::active(),
		}
	}

	/// Sets the amount aggregated across all records sharing this name.
	pub fn with_value_to_sum(mut self, value: f64) -> Self {
		self.value_to_sum = Some(value);
		self
	}

	/// Sets the parameter segments for this record.
	///
	/// The parameters must already have passed [`Parameters::validate`].
	pub fn with_parameters(mut self, parameters: Parameters) -> Self {
		self.parameters = parameters;
		self
	}

	/// Attributes this record to a specific identity instead of the
	/// process-wide active one.
	pub fn with_identity(mut self, identity: IdentityContext) -> Self {
		self.identity = identity;
		self
	}
}

/// An ordered group of records drained together for delivery.
///
/// Order is insertion order. The buffer owns records until a flush drains
/// them into a batch; on a retryable delivery failure the whole batch is
/// handed back and prepended, preserving order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventBatch {
	events: Vec<EventRecord>,
}

impl EventBatch {
	/// Wraps a sequence of records, oldest first.
	pub fn new(events: Vec<EventRecord>) -> Self {
		Self { events }
	}

	/// Returns the number of records in the batch.
	pub fn len(&self) -> usize {
		self.events.len()
	}

	/// Returns true if the batch holds no records.
	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}

	/// Returns the records, oldest first.
	pub fn records(&self) -> &[EventRecord] {
		&self.events
	}

	/// Consumes the batch, yielding its records oldest first.
	pub fn into_records(self) -> Vec<EventRecord> {
		self.events
	}
}

impl IntoIterator for EventBatch {
	type Item = EventRecord;
	type IntoIter = std::vec::IntoIter<EventRecord>;

	fn into_iter(self) -> Self::IntoIter {
		self.events.into_iter()
	}
}
