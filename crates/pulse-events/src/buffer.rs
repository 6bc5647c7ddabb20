// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Thread-safe accumulator of pending event records.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::warn;

use pulse_events_core::{EventBatch, EventRecord};

struct Inner {
	queue: VecDeque<EventRecord>,
	last_flush: Instant,
}

/// Holds records logged but not yet delivered.
///
/// All operations take the internal lock for the duration of the queue
/// mutation only; callers never block on the network. `drain` is atomic
/// with respect to concurrent `append`: a record is in the buffer or in
/// exactly one batch, never both and never neither.
pub struct EventBuffer {
	inner: Mutex<Inner>,
	max_buffered: usize,
}

impl EventBuffer {
	/// Creates an empty buffer with the given record ceiling.
	///
	/// A zero ceiling is clamped to one; the buffer must always be able
	/// to hold the record being appended.
	pub fn new(max_buffered: usize) -> Self {
		Self {
			inner: Mutex::new(Inner {
				queue: VecDeque::new(),
				last_flush: Instant::now(),
			}),
			max_buffered: max_buffered.max(1),
		}
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
		self.inner.lock().unwrap_or_else(|e| e.into_inner())
	}

	/// Appends a record at the tail and returns the new buffered count.
	///
	/// Past the ceiling, the oldest records are dropped so the buffer
	/// cannot grow without bound while offline.
	pub fn append(&self, record: EventRecord) -> usize {
		let mut inner = self.lock();
		while inner.queue.len() >= self.max_buffered {
			let Some(dropped) = inner.queue.pop_front() else {
				break;
			};
			warn!(
				event_name = %dropped.name,
				distinct_id = %dropped.identity.distinct_id,
				"dropped event due to buffer overflow"
			);
		}
		inner.queue.push_back(record);
		inner.queue.len()
	}

	/// Atomically removes and returns all buffered records, oldest
	/// first, resetting the time-since-last-flush marker.
	pub fn drain(&self) -> EventBatch {
		let mut inner = self.lock();
		inner.last_flush = Instant::now();
		EventBatch::new(inner.queue.drain(..).collect())
	}

	/// Re-inserts a batch at the head, preserving oldest-first order.
	///
	/// Used when a delivery attempt fails with a retryable reason. The
	/// ceiling still applies; if restoring overflows it, the oldest
	/// records are dropped. Returns the number of records dropped.
	pub fn restore(&self, batch: EventBatch) -> usize {
		let mut inner = self.lock();
		for record in batch.into_records().into_iter().rev() {
			inner.queue.push_front(record);
		}
		let mut dropped = 0usize;
		while inner.queue.len() > self.max_buffered {
			inner.queue.pop_front();
			dropped += 1;
		}
		if dropped > 0 {
			warn!(dropped, "dropped oldest events while restoring failed batch");
		}
		dropped
	}

	/// Returns the number of buffered records.
	pub fn len(&self) -> usize {
		self.lock().queue.len()
	}

	/// Returns true if no records are buffered.
	pub fn is_empty(&self) -> bool {
		self.lock().queue.is_empty()
	}

	/// Time elapsed since the last drain.
	pub fn elapsed_since_flush(&self) -> Duration {
		self.lock().last_flush.elapsed()
	}

	/// Serializes the buffered records verbatim for persistence across a
	/// suspend/resume cycle. The buffer is left untouched.
	pub fn snapshot(&self) -> Result<Vec<u8>, serde_json::Error> {
		let inner = self.lock();
		let records: Vec<&EventRecord> = inner.queue.iter().collect();
		serde_json::to_vec(&records)
	}

	/// Restores records from a persisted snapshot, inserting them ahead
	/// of anything logged since process start. Returns the number of
	/// records restored (after applying the ceiling).
	pub fn restore_snapshot(&self, bytes: &[u8]) -> Result<usize, serde_json::Error> {
		let records: Vec<EventRecord> = serde_json::from_slice(bytes)?;
		let count = records.len();
		let dropped = self.restore(EventBatch::new(records));
		Ok(count.saturating_sub(dropped))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use pulse_events_core::EventName;

	fn record(name: &str) -> EventRecord {
		EventRecord::new(EventName::new(name).unwrap())
	}

	#[test]
	fn append_then_drain_preserves_order() {
		let buffer = EventBuffer::new(100);
		buffer.append(record("event_a"));
		buffer.append(record("event_b"));
		buffer.append(record("event_c"));

		let batch = buffer.drain();
		let names: Vec<&str> = batch.records().iter().map(|r| r.name.as_str()).collect();
		assert_eq!(names, ["event_a", "event_b", "event_c"]);
		assert!(buffer.is_empty());
	}

	#[test]
	fn drain_resets_count_and_flush_marker() {
		let buffer = EventBuffer::new(100);
		buffer.append(record("event_a"));
		assert_eq!(buffer.len(), 1);

		let _ = buffer.drain();
		assert_eq!(buffer.len(), 0);
		assert!(buffer.elapsed_since_flush() < Duration::from_secs(1));
	}

	#[test]
	fn restore_prepends_preserving_order() {
		let buffer = EventBuffer::new(100);
		buffer.append(record("old_a"));
		buffer.append(record("old_b"));
		let failed = buffer.drain();

		// Events logged while the failed batch was in flight.
		buffer.append(record("new_c"));

		buffer.restore(failed);
		let batch = buffer.drain();
		let names: Vec<&str> = batch.records().iter().map(|r| r.name.as_str()).collect();
		assert_eq!(names, ["old_a", "old_b", "new_c"]);
	}

	#[test]
	fn overflow_drops_oldest() {
		let buffer = EventBuffer::new(3);
		for i in 0..5 {
			buffer.append(record(&format!("event_{i}")));
		}
		assert_eq!(buffer.len(), 3);

		let batch = buffer.drain();
		let names: Vec<&str> = batch.records().iter().map(|r| r.name.as_str()).collect();
		assert_eq!(names, ["event_2", "event_3", "event_4"]);
	}

	#[test]
	fn zero_ceiling_clamps_instead_of_wedging() {
		let buffer = EventBuffer::new(0);
		assert_eq!(buffer.append(record("only_event")), 1);

		buffer.append(record("next_event"));
		let batch = buffer.drain();
		let names: Vec<&str> = batch.records().iter().map(|r| r.name.as_str()).collect();
		assert_eq!(names, ["next_event"]);
	}

	#[test]
	fn restore_snapshot_counts_only_survivors() {
		let buffer = EventBuffer::new(3);
		buffer.append(record("snap_a"));
		buffer.append(record("snap_b"));
		let bytes = buffer.snapshot().unwrap();

		let next_launch = EventBuffer::new(3);
		next_launch.append(record("fresh_a"));
		next_launch.append(record("fresh_b"));
		let restored = next_launch.restore_snapshot(&bytes).unwrap();
		assert_eq!(restored, 1);
		assert_eq!(next_launch.len(), 3);

		let batch = next_launch.drain();
		let names: Vec<&str> = batch.records().iter().map(|r| r.name.as_str()).collect();
		assert_eq!(names, ["snap_b", "fresh_a", "fresh_b"]);
	}

	#[test]
	fn restore_respects_ceiling() {
		let buffer = EventBuffer::new(2);
		let batch = EventBatch::new(vec![record("r_one"), record("r_two"), record("r_three")]);
		buffer.restore(batch);
		assert_eq!(buffer.len(), 2);

		let drained = buffer.drain();
		let names: Vec<&str> = drained.records().iter().map(|r| r.name.as_str()).collect();
		assert_eq!(names, ["r_two", "r_three"]);
	}

	#[test]
	fn snapshot_roundtrip() {
		let buffer = EventBuffer::new(100);
		buffer.append(record("event_a"));
		buffer.append(record("event_b"));
		let bytes = buffer.snapshot().unwrap();

		// Snapshot leaves the buffer untouched.
		assert_eq!(buffer.len(), 2);

		let restored = EventBuffer::new(100);
		let count = restored.restore_snapshot(&bytes).unwrap();
		assert_eq!(count, 2);

		assert_eq!(restored.drain().records(), buffer.drain().records());
	}

	#[test]
	fn snapshot_restore_goes_ahead_of_new_events() {
		let buffer = EventBuffer::new(100);
		buffer.append(record("suspended_a"));
		let bytes = buffer.snapshot().unwrap();

		let next_launch = EventBuffer::new(100);
		next_launch.append(record("fresh_b"));
		next_launch.restore_snapshot(&bytes).unwrap();

		let names: Vec<String> = next_launch
			.drain()
			.into_records()
			.into_iter()
			.map(|r| r.name.to_string())
			.collect();
		assert_eq!(names, ["suspended_a", "fresh_b"]);
	}

	#[test]
	fn restore_snapshot_rejects_garbage() {
		let buffer = EventBuffer::new(100);
		assert!(buffer.restore_snapshot(b"not json").is_err());
		assert!(buffer.is_empty());
	}

	#[test]
	fn concurrent_appends_lose_nothing() {
		use std::sync::Arc;

		let buffer = Arc::new(EventBuffer::new(10_000));
		let threads: Vec<_> = (0..32)
			.map(|i| {
				let buffer = Arc::clone(&buffer);
				std::thread::spawn(move || {
					buffer.append(record(&format!("thread_{i}")));
				})
			})
			.collect();
		for t in threads {
			t.join().unwrap();
		}
		assert_eq!(buffer.len(), 32);

		let batch = buffer.drain();
		let unique: std::collections::HashSet<&str> =
			batch.records().iter().map(|r| r.name.as_str()).collect();
		assert_eq!(unique.len(), 32);
	}

	#[test]
	fn concurrent_append_and_drain_races_safely() {
		use std::sync::Arc;

		let buffer = Arc::new(EventBuffer::new(10_000));
		let producer = {
			let buffer = Arc::clone(&buffer);
			std::thread::spawn(move || {
				for i in 0..500 {
					buffer.append(record(&format!("event_{i}")));
				}
			})
		};
		let drainer = {
			let buffer = Arc::clone(&buffer);
			std::thread::spawn(move || {
				let mut collected = 0usize;
				for _ in 0..50 {
					collected += buffer.drain().len();
					std::thread::yield_now();
				}
				collected
			})
		};
		producer.join().unwrap();
		let drained = drainer.join().unwrap();
		let remaining = buffer.drain().len();
		assert_eq!(drained + remaining, 500);
	}

	proptest! {
		#[test]
		fn append_drain_conserves_records(rounds in proptest::collection::vec(1..20usize, 1..8)) {
			let buffer = EventBuffer::new(10_000);
			let mut appended = 0usize;
			let mut drained = 0usize;
			for (round, n) in rounds.iter().enumerate() {
				for i in 0..*n {
					buffer.append(record(&format!("event_{round}_{i}")));
					appended += 1;
				}
				drained += buffer.drain().len();
			}
			prop_assert_eq!(drained, appended);
			prop_assert!(buffer.is_empty());
		}

		#[test]
		fn buffer_never_exceeds_ceiling(ceiling in 1..50usize, count in 1..200usize) {
			let buffer = EventBuffer::new(ceiling);
			for i in 0..count {
				buffer.append(record(&format!("event_{i}")));
			}
			prop_assert!(buffer.len() <= ceiling);
			prop_assert_eq!(buffer.len(), count.min(ceiling));
		}
	}
}
