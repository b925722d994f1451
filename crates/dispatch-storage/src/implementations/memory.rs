//! In-memory storage backend implementation for the dispatch service.
//!
//! This module provides a memory-based implementation of the StorageInterface
//! trait, useful for testing and development scenarios where persistence is
//! not required.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use async_trait::async_trait;
use dispatch_types::ImplementationRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage implementation.
///
/// This implementation stores records in a HashMap in memory, providing fast
/// access but no persistence across restarts. Version checks run under the
/// map's write lock, so conditional writes are atomic.
///
/// Cloning shares the underlying store, which lets tests model several
/// processes over one database.
#[derive(Clone)]
pub struct MemoryStorage {
	/// The in-memory store protected by a read-write lock.
	/// Values are (version, bytes) pairs.
	store: Arc<RwLock<HashMap<String, (u64, Vec<u8>)>>>,
}

impl MemoryStorage {
	/// Creates a new MemoryStorage instance.
	pub fn new() -> Self {
		Self {
			store: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<(Vec<u8>, u64), StorageError> {
		let store = self.store.read().await;
		store
			.get(key)
			.map(|(version, bytes)| (bytes.clone(), *version))
			.ok_or(StorageError::NotFound)
	}

	async fn create_bytes(&self, key: &str, value: Vec<u8>) -> Result<u64, StorageError> {
		let mut store = self.store.write().await;
		if store.contains_key(key) {
			return Err(StorageError::AlreadyExists);
		}
		store.insert(key.to_string(), (1, value));
		Ok(1)
	}

	async fn replace_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		expected_version: u64,
	) -> Result<u64, StorageError> {
		let mut store = self.store.write().await;
		let entry = store.get_mut(key).ok_or(StorageError::NotFound)?;
		if entry.0 != expected_version {
			return Err(StorageError::Conflict {
				expected: expected_version,
				found: entry.0,
			});
		}
		let new_version = entry.0 + 1;
		*entry = (new_version, value);
		Ok(new_version)
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let store = self.store.read().await;
		Ok(store.contains_key(key))
	}
}

/// Registry for the memory storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

/// Factory function to create a memory storage backend from configuration.
///
/// Configuration parameters:
/// - None required for memory storage
pub fn create_storage(_config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	Ok(Box::new(MemoryStorage::new()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_basic_operations() {
		let storage = MemoryStorage::new();

		let key = "test_key";
		let value = b"test_value".to_vec();
		let version = storage.create_bytes(key, value.clone()).await.unwrap();
		assert_eq!(version, 1);

		let (retrieved, version) = storage.get_bytes(key).await.unwrap();
		assert_eq!(retrieved, value);
		assert_eq!(version, 1);

		assert!(storage.exists(key).await.unwrap());

		storage.delete(key).await.unwrap();
		assert!(!storage.exists(key).await.unwrap());

		let result = storage.get_bytes(key).await;
		assert!(matches!(result, Err(StorageError::NotFound)));
	}

	#[tokio::test]
	async fn test_create_existing_key_fails() {
		let storage = MemoryStorage::new();

		storage.create_bytes("key", b"a".to_vec()).await.unwrap();
		let result = storage.create_bytes("key", b"b".to_vec()).await;
		assert!(matches!(result, Err(StorageError::AlreadyExists)));
	}

	#[tokio::test]
	async fn test_conditional_replace() {
		let storage = MemoryStorage::new();

		let v1 = storage.create_bytes("key", b"a".to_vec()).await.unwrap();
		let v2 = storage
			.replace_bytes("key", b"b".to_vec(), v1)
			.await
			.unwrap();
		assert_eq!(v2, v1 + 1);

		// A writer holding the old version must lose.
		let result = storage.replace_bytes("key", b"c".to_vec(), v1).await;
		assert!(matches!(
			result,
			Err(StorageError::Conflict {
				expected: 1,
				found: 2
			})
		));

		let (bytes, version) = storage.get_bytes("key").await.unwrap();
		assert_eq!(bytes, b"b".to_vec());
		assert_eq!(version, v2);
	}

	#[tokio::test]
	async fn test_replace_missing_key() {
		let storage = MemoryStorage::new();

		let result = storage.replace_bytes("absent", b"a".to_vec(), 1).await;
		assert!(matches!(result, Err(StorageError::NotFound)));
	}

	#[tokio::test]
	async fn test_clone_shares_store() {
		let storage = MemoryStorage::new();
		let other = storage.clone();

		storage.create_bytes("key", b"a".to_vec()).await.unwrap();
		assert!(other.exists("key").await.unwrap());
	}
}
