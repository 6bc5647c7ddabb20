// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the events SDK.

use pulse_events_core::EventValidationError;
use thiserror::Error;

/// Events SDK errors.
#[derive(Debug, Error)]
pub enum EventsError {
	/// Local event validation failed; the record was not buffered.
	#[error("event validation failed: {0}")]
	Validation(#[from] EventValidationError),

	/// Snapshot persistence failed.
	#[error("snapshot I/O failed: {0}")]
	Snapshot(#[from] std::io::Error),

	/// Serialization of a batch or snapshot failed.
	#[error("serialization failed: {0}")]
	Serialization(#[from] serde_json::Error),

	/// A global logger is already installed.
	#[error("global event logger already initialized")]
	AlreadyInitialized,

	/// The logger has been shut down.
	#[error("event logger has been shut down")]
	Shutdown,
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, EventsError>;
