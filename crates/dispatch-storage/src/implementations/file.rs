//! File-based storage backend implementation for the dispatch service.
//!
//! This module stores each record as a binary file on the filesystem,
//! providing simple persistence without external dependencies. Files carry a
//! fixed header with the record version so conditional replacement works
//! across restarts.

use crate::locks::KeyedLocks;
use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use async_trait::async_trait;
use dispatch_types::ImplementationRegistry;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::fs;

#[allow(clippy::doc_nested_refdefs)]
/// Fixed-size file header carrying the record version.
///
/// Binary layout (64 bytes total):
/// - [0-3]: Magic bytes "DSPR"
/// - [4-5]: Format version (u16, little-endian)
/// - [6-13]: Record version (u64, little-endian)
/// - [14-63]: Reserved/padding for future use
#[derive(Debug, Clone)]
struct FileHeader {
	magic: [u8; 4],
	format: u16,
	record_version: u64,
	padding: [u8; 50],
}

impl FileHeader {
	const MAGIC: &'static [u8; 4] = b"DSPR";
	const FORMAT: u16 = 1;
	const SIZE: usize = 64;

	/// Creates a new header for the given record version.
	fn new(record_version: u64) -> Self {
		Self {
			magic: *Self::MAGIC,
			format: Self::FORMAT,
			record_version,
			padding: [0; 50],
		}
	}

	/// Serializes the header to bytes.
	fn serialize(&self) -> [u8; Self::SIZE] {
		let mut bytes = [0u8; Self::SIZE];
		bytes[0..4].copy_from_slice(&self.magic);
		bytes[4..6].copy_from_slice(&self.format.to_le_bytes());
		bytes[6..14].copy_from_slice(&self.record_version.to_le_bytes());
		bytes[14..64].copy_from_slice(&self.padding);
		bytes
	}

	/// Deserializes a header from bytes.
	fn deserialize(bytes: &[u8]) -> Result<Self, StorageError> {
		if bytes.len() < Self::SIZE {
			return Err(StorageError::Backend("File too small for header".into()));
		}

		let mut magic = [0u8; 4];
		magic.copy_from_slice(&bytes[0..4]);
		if magic != *Self::MAGIC {
			return Err(StorageError::Backend("Unrecognized file format".into()));
		}

		let format = u16::from_le_bytes([bytes[4], bytes[5]]);
		if format > Self::FORMAT {
			return Err(StorageError::Backend(format!(
				"Unsupported file format version: {}",
				format
			)));
		}

		let mut version_bytes = [0u8; 8];
		version_bytes.copy_from_slice(&bytes[6..14]);
		let record_version = u64::from_le_bytes(version_bytes);

		let mut padding = [0u8; 50];
		padding.copy_from_slice(&bytes[14..64]);

		Ok(Self {
			magic,
			format,
			record_version,
			padding,
		})
	}
}

/// File-based storage implementation.
///
/// Each record lives in its own file under the base path. Writes go to a
/// temporary file and are renamed into place, and a per-key lock serializes
/// writers within the process, so the version check in `replace_bytes` is
/// atomic.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
	/// Per-key write locks for read-modify-write operations.
	write_locks: KeyedLocks,
}

impl FileStorage {
	/// Creates a new FileStorage instance with the specified base path.
	pub fn new(base_path: PathBuf) -> Self {
		Self {
			base_path,
			write_locks: KeyedLocks::new(),
		}
	}

	/// Converts a storage key to a filesystem-safe file path.
	///
	/// Sanitizes the key by replacing problematic characters and
	/// appending a .bin extension.
	fn get_file_path(&self, key: &str) -> PathBuf {
		let safe_key = key.replace(['/', ':'], "_");
		self.base_path.join(format!("{}.bin", safe_key))
	}

	/// Reads and parses a record file.
	async fn read_record(&self, key: &str) -> Result<(Vec<u8>, u64), StorageError> {
		let path = self.get_file_path(key);

		let data = match fs::read(&path).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(StorageError::NotFound)
			}
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let header = FileHeader::deserialize(&data)?;
		let payload = if data.len() > FileHeader::SIZE {
			data[FileHeader::SIZE..].to_vec()
		} else {
			Vec::new()
		};
		Ok((payload, header.record_version))
	}

	/// Writes a record atomically by writing to a temp file then renaming.
	async fn write_record(
		&self,
		key: &str,
		value: &[u8],
		record_version: u64,
	) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		let header = FileHeader::new(record_version);
		let mut file_data = Vec::with_capacity(FileHeader::SIZE + value.len());
		file_data.extend_from_slice(&header.serialize());
		file_data.extend_from_slice(value);

		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, file_data)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		tracing::debug!(
			"Wrote record {} at version {} ({} bytes)",
			key,
			record_version,
			value.len()
		);
		Ok(())
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<(Vec<u8>, u64), StorageError> {
		self.read_record(key).await
	}

	async fn create_bytes(&self, key: &str, value: Vec<u8>) -> Result<u64, StorageError> {
		let _guard = self.write_locks.lock(key).await;

		match self.read_record(key).await {
			Ok(_) => return Err(StorageError::AlreadyExists),
			Err(StorageError::NotFound) => {}
			Err(e) => return Err(e),
		}

		self.write_record(key, &value, 1).await?;
		Ok(1)
	}

	async fn replace_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		expected_version: u64,
	) -> Result<u64, StorageError> {
		let _guard = self.write_locks.lock(key).await;

		let (_, current_version) = self.read_record(key).await?;
		if current_version != expected_version {
			return Err(StorageError::Conflict {
				expected: expected_version,
				found: current_version,
			});
		}

		let new_version = current_version + 1;
		self.write_record(key, &value, new_version).await?;
		Ok(new_version)
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let _guard = self.write_locks.lock(key).await;

		let path = self.get_file_path(key);
		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.get_file_path(key);
		Ok(path.exists())
	}
}

/// Configuration for the file storage backend.
#[derive(Debug, Deserialize)]
struct FileStorageConfig {
	/// Base directory for record files.
	#[serde(default = "default_storage_path")]
	storage_path: String,
}

fn default_storage_path() -> String {
	"./data/storage".to_string()
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for record files (default: "./data/storage")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let config: FileStorageConfig = config
		.clone()
		.try_into()
		.map_err(|e: toml::de::Error| StorageError::Configuration(e.message().to_string()))?;

	Ok(Box::new(FileStorage::new(PathBuf::from(
		config.storage_path,
	))))
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn storage() -> (TempDir, FileStorage) {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());
		(dir, storage)
	}

	#[tokio::test]
	async fn test_create_and_get() {
		let (_dir, storage) = storage();

		let version = storage
			.create_bytes("orders:1", b"payload".to_vec())
			.await
			.unwrap();
		assert_eq!(version, 1);

		let (bytes, version) = storage.get_bytes("orders:1").await.unwrap();
		assert_eq!(bytes, b"payload".to_vec());
		assert_eq!(version, 1);
	}

	#[tokio::test]
	async fn test_version_survives_replace() {
		let (_dir, storage) = storage();

		let v1 = storage.create_bytes("key", b"a".to_vec()).await.unwrap();
		let v2 = storage
			.replace_bytes("key", b"b".to_vec(), v1)
			.await
			.unwrap();
		assert_eq!(v2, 2);

		let result = storage.replace_bytes("key", b"c".to_vec(), v1).await;
		assert!(matches!(result, Err(StorageError::Conflict { .. })));

		let (bytes, version) = storage.get_bytes("key").await.unwrap();
		assert_eq!(bytes, b"b".to_vec());
		assert_eq!(version, 2);
	}

	#[tokio::test]
	async fn test_delete_is_idempotent() {
		let (_dir, storage) = storage();

		storage.create_bytes("key", b"a".to_vec()).await.unwrap();
		storage.delete("key").await.unwrap();
		storage.delete("key").await.unwrap();
		assert!(!storage.exists("key").await.unwrap());
	}

	#[tokio::test]
	async fn test_write_locks_do_not_accumulate() {
		let (_dir, storage) = storage();

		for i in 0..4 {
			storage
				.create_bytes(&format!("orders:{}", i), b"x".to_vec())
				.await
				.unwrap();
		}
		storage.delete("orders:0").await.unwrap();

		assert!(storage.write_locks.is_empty());
	}

	#[tokio::test]
	async fn test_header_round_trip() {
		let header = FileHeader::new(42);
		let bytes = header.serialize();
		let parsed = FileHeader::deserialize(&bytes).unwrap();
		assert_eq!(parsed.record_version, 42);
		assert_eq!(parsed.format, FileHeader::FORMAT);
	}

	#[tokio::test]
	async fn test_rejects_foreign_file() {
		let (_dir, storage) = storage();

		let path = storage.get_file_path("key");
		fs::create_dir_all(path.parent().unwrap()).await.unwrap();
		fs::write(&path, b"not a record file, no header").await.unwrap();

		let result = storage.get_bytes("key").await;
		assert!(matches!(result, Err(StorageError::Backend(_))));
	}
}
