// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Buffer persistence across app suspension.
//!
//! When the lifecycle collaborator signals that the app will suspend,
//! the pending buffer is snapshotted to disk; at the next launch the
//! snapshot is restored ahead of newly logged events and the file is
//! removed. The snapshot format is an internal detail with no external
//! compatibility requirement.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::buffer::EventBuffer;
use crate::error::Result;

/// File-backed store for buffer snapshots.
pub struct SnapshotStore {
	path: PathBuf,
}

impl SnapshotStore {
	/// Creates a store writing to the given path.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Returns the snapshot file path.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Snapshots the buffer to disk, replacing any previous snapshot.
	/// Returns the number of records written.
	///
	/// The write goes through a temporary file and rename so a crash
	/// mid-write cannot leave a truncated snapshot.
	pub fn save(&self, buffer: &EventBuffer) -> Result<usize> {
		let count = buffer.len();
		let bytes = buffer.snapshot()?;

		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent)?;
		}
		let tmp = self.path.with_extension("tmp");
		fs::write(&tmp, &bytes)?;
		fs::rename(&tmp, &self.path)?;

		debug!(events = count, path = %self.path.display(), "buffer snapshot saved");
		Ok(count)
	}

	/// Restores a snapshot into the buffer and removes the file.
	/// Returns the number of records restored; zero if no snapshot
	/// exists.
	///
	/// A corrupt snapshot is discarded with a warning rather than
	/// failing the launch path.
	pub fn load(&self, buffer: &EventBuffer) -> Result<usize> {
		let bytes = match fs::read(&self.path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
			Err(e) => return Err(e.into()),
		};

		let count = match buffer.restore_snapshot(&bytes) {
			Ok(count) => count,
			Err(e) => {
				warn!(path = %self.path.display(), error = %e, "discarding corrupt buffer snapshot");
				0
			}
		};
		fs::remove_file(&self.path)?;

		debug!(events = count, path = %self.path.display(), "buffer snapshot restored");
		Ok(count)
	}
}
