// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity attribution for logged events.
//!
//! The session/identity system itself is an external collaborator; the
//! SDK only carries a lightweight handle so each record can be attributed
//! to a user. A process-wide active identity serves as the default when a
//! caller does not name one explicitly.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Distinct id used when no active identity has been set.
pub const ANONYMOUS_DISTINCT_ID: &str = "anonymous";

static ACTIVE: RwLock<Option<IdentityContext>> = RwLock::new(None);

/// The user/session attribution associated with a logged event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
	pub distinct_id: String,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub app_id: Option<String>,
}

impl IdentityContext {
	/// Creates an identity for the given distinct id.
	pub fn new(distinct_id: impl Into<String>) -> Self {
		Self {
			distinct_id: distinct_id.into(),
			app_id: None,
		}
	}

	/// Sets the application id this identity belongs to.
	pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
		self.app_id = Some(app_id.into());
		self
	}

	/// The placeholder identity used before any identity is known.
	pub fn anonymous() -> Self {
		Self::new(ANONYMOUS_DISTINCT_ID)
	}

	/// Returns the process-wide active identity, or the anonymous
	/// identity if none has been set.
	pub fn active() -> Self {
		ACTIVE
			.read()
			.ok()
			.and_then(|guard| guard.clone())
			.unwrap_or_else(Self::anonymous)
	}

	/// Sets the process-wide active identity used as the default
	/// attribution for subsequently logged events.
	pub fn set_active(identity: IdentityContext) {
		if let Ok(mut guard) = ACTIVE.write() {
			*guard = Some(identity);
		}
	}

	/// Clears the process-wide active identity.
	pub fn clear_active() {
		if let Ok(mut guard) = ACTIVE.write() {
			*guard = None;
		}
	}
}
