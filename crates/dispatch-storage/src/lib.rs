//! Storage module for the dispatch system.
//!
//! This module provides abstractions for persistent storage of dispatch data.
//! Every record carries a version that backends check on write, giving the
//! lifecycle manager the atomic conditional updates it needs for conflict
//! detection. Backends include in-memory and file-based implementations.

use async_trait::async_trait;
use dispatch_types::{ImplementationRegistry, StorageKey};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Keyed async locks shared by backends and the lifecycle core.
pub mod locks;

pub use locks::{KeyedGuard, KeyedLocks};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested record is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs when creating a record under a key that exists.
	#[error("Already exists")]
	AlreadyExists,
	/// Error that occurs when a conditional write loses to a concurrent one.
	#[error("Version conflict: expected {expected}, found {found}")]
	Conflict { expected: u64, found: u64 },
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration parsing.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// A value read from storage together with the version it was read at.
///
/// The version is what callers hand back to `replace_bytes`/`update` to get
/// compare-and-swap semantics.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
	/// The deserialized record.
	pub value: T,
	/// The record version at read time.
	pub version: u64,
}

/// Trait defining the low-level interface for storage backends.
///
/// This trait must be implemented by any storage backend that wants to
/// integrate with the dispatch system. It provides versioned key-value
/// operations: every stored record has a monotonically increasing version,
/// and replacement is conditional on the caller's expected version.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes and the current version for the given key.
	async fn get_bytes(&self, key: &str) -> Result<(Vec<u8>, u64), StorageError>;

	/// Creates a new record. Fails with `AlreadyExists` if the key is taken.
	/// Returns the initial version.
	async fn create_bytes(&self, key: &str, value: Vec<u8>) -> Result<u64, StorageError>;

	/// Replaces an existing record if its current version matches
	/// `expected_version`. Fails with `NotFound` if the key is absent and
	/// with `Conflict` if the version does not match. Returns the new
	/// version.
	async fn replace_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		expected_version: u64,
	) -> Result<u64, StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations must
/// provide to create instances of their storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
///
/// This trait extends the base ImplementationRegistry to specify that
/// storage implementations must provide a StorageFactory.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage
/// implementations. This is used by the service to wire the configured
/// backend.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level storage service that provides typed operations.
///
/// The StorageService wraps a low-level storage backend and provides
/// convenient methods for storing and retrieving typed records with
/// automatic JSON serialization and version bookkeeping.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn key(namespace: StorageKey, id: &str) -> String {
		format!("{}:{}", namespace.as_str(), id)
	}

	/// Stores a new record. Fails with `AlreadyExists` if a record already
	/// exists under this namespace and id. Returns the initial version.
	pub async fn store_new<T: Serialize>(
		&self,
		namespace: StorageKey,
		id: &str,
		data: &T,
	) -> Result<u64, StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.create_bytes(&Self::key(namespace, id), bytes).await
	}

	/// Retrieves and deserializes a record from storage, along with the
	/// version it was read at.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: StorageKey,
		id: &str,
	) -> Result<Versioned<T>, StorageError> {
		let (bytes, version) = self.backend.get_bytes(&Self::key(namespace, id)).await?;
		let value = serde_json::from_slice(&bytes)
			.map_err(|e| StorageError::Serialization(e.to_string()))?;
		Ok(Versioned { value, version })
	}

	/// Replaces an existing record, conditional on the version the caller
	/// last read. Fails with `Conflict` if the record changed in between,
	/// making lost updates impossible. Returns the new version.
	pub async fn update<T: Serialize>(
		&self,
		namespace: StorageKey,
		id: &str,
		data: &T,
		expected_version: u64,
	) -> Result<u64, StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend
			.replace_bytes(&Self::key(namespace, id), bytes, expected_version)
			.await
	}

	/// Removes a record from storage.
	pub async fn remove(&self, namespace: StorageKey, id: &str) -> Result<(), StorageError> {
		self.backend.delete(&Self::key(namespace, id)).await
	}

	/// Checks if a record exists in storage.
	pub async fn exists(&self, namespace: StorageKey, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&Self::key(namespace, id)).await
	}
}
