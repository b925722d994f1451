//! Catalog module for the dispatch system.
//!
//! This module provides the catalog collaborator the lifecycle manager uses
//! to validate ordered product and combo references. The interface is an
//! existence check only; browsing and filtering belong to the catalog
//! service itself.

use async_trait::async_trait;
use dispatch_types::{ImplementationRegistry, ItemKind};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
	/// Error that occurs in the catalog backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration parsing.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for catalog implementations.
#[async_trait]
pub trait CatalogInterface: Send + Sync {
	/// Checks whether an item of the given kind exists in the catalog.
	async fn item_exists(&self, kind: ItemKind, id: &str) -> Result<bool, CatalogError>;
}

/// Type alias for catalog factory functions.
///
/// This is the function signature that all catalog implementations must
/// provide to create instances of their catalog interface.
pub type CatalogFactory = fn(&toml::Value) -> Result<Box<dyn CatalogInterface>, CatalogError>;

/// Registry trait for catalog implementations.
///
/// This trait extends the base ImplementationRegistry to specify that
/// catalog implementations must provide a CatalogFactory.
pub trait CatalogRegistry: ImplementationRegistry<Factory = CatalogFactory> {}

/// Get all registered catalog implementations.
pub fn get_all_implementations() -> Vec<(&'static str, CatalogFactory)> {
	use implementations::memory;

	vec![(memory::Registry::NAME, memory::Registry::factory())]
}

/// High-level catalog service wrapping a backend implementation.
pub struct CatalogService {
	/// The underlying catalog backend implementation.
	backend: Box<dyn CatalogInterface>,
}

impl CatalogService {
	/// Creates a new CatalogService with the specified backend.
	pub fn new(backend: Box<dyn CatalogInterface>) -> Self {
		Self { backend }
	}

	/// Checks whether an item of the given kind exists in the catalog.
	pub async fn item_exists(&self, kind: ItemKind, id: &str) -> Result<bool, CatalogError> {
		self.backend.item_exists(kind, id).await
	}
}
