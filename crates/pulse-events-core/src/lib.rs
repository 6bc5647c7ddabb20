// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Pulse app analytics.
//!
//! This crate provides the leaf data model shared by the SDK and any
//! server-side consumers:
//! - `EventRecord` and `EventBatch`: immutable logged occurrences
//! - `EventName` and `Parameters`: validated names and key/value segments
//! - `UsageRegistry`: process-wide ceilings on distinct names and keys
//! - `IdentityContext`: user/session attribution for logged events
//! - `names`: predefined event and parameter name constants

mod error;
mod event;
mod identity;
pub mod names;
mod registry;

pub use error::EventValidationError;
pub use event::{
	EventBatch, EventName, EventRecord, ParamValue, Parameters, MAX_NAME_LENGTH,
	MAX_PARAM_VALUE_LENGTH, MIN_NAME_LENGTH,
};
pub use identity::{IdentityContext, ANONYMOUS_DISTINCT_ID};
pub use registry::{UsageRegistry, MAX_PARAM_KEYS_PER_EVENT, MAX_UNIQUE_EVENT_NAMES};
