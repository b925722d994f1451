//! Keyed async locks with eviction of idle entries.
//!
//! A lock map keyed by entity id would otherwise grow with every id ever
//! touched. The guard returned by [`KeyedLocks::lock`] removes its entry on
//! drop when no other holder or waiter has a handle to it, keeping the map
//! proportional to in-flight work rather than history.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A map of named async locks.
pub struct KeyedLocks {
	locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
	/// Creates an empty lock map.
	pub fn new() -> Self {
		Self {
			locks: Arc::new(DashMap::new()),
		}
	}

	/// Acquires the lock for the given key, creating it on first use.
	pub async fn lock(&self, key: &str) -> KeyedGuard {
		let lock = self
			.locks
			.entry(key.to_string())
			.or_insert_with(|| Arc::new(Mutex::new(())))
			.clone();
		let guard = lock.lock_owned().await;
		KeyedGuard {
			locks: Arc::clone(&self.locks),
			key: key.to_string(),
			guard: Some(guard),
		}
	}

	/// Number of keys currently tracked.
	pub fn len(&self) -> usize {
		self.locks.len()
	}

	/// Returns true if no keys are tracked.
	pub fn is_empty(&self) -> bool {
		self.locks.is_empty()
	}
}

impl Default for KeyedLocks {
	fn default() -> Self {
		Self::new()
	}
}

/// Guard for one key. Dropping it releases the lock and evicts the map
/// entry if nobody else holds or waits on it.
pub struct KeyedGuard {
	locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
	key: String,
	guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyedGuard {
	fn drop(&mut self) {
		// Release the mutex before counting handles.
		self.guard.take();
		// remove_if evaluates under the shard lock, so no new handle can
		// be cloned out of the map between the count check and removal.
		self.locks
			.remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
	}
}
