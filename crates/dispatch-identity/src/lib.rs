//! Identity module for the dispatch system.
//!
//! This module provides the identity collaborator the lifecycle manager uses
//! to validate client and courier references. It defines the lookup
//! interface and a config-seeded in-memory implementation.

use async_trait::async_trait;
use dispatch_types::{ImplementationRegistry, UserRecord};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
	/// Error that occurs when the requested user does not exist.
	#[error("User not found: {0}")]
	UserNotFound(String),
	/// Error that occurs in the identity backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration parsing.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for identity implementations.
///
/// This trait must be implemented by any identity source that wants to
/// integrate with the dispatch system. It resolves user ids to the minimal
/// record the lifecycle manager needs.
#[async_trait]
pub trait IdentityInterface: Send + Sync {
	/// Looks up a user by id.
	async fn get_user(&self, id: &str) -> Result<UserRecord, IdentityError>;
}

/// Type alias for identity factory functions.
///
/// This is the function signature that all identity implementations must
/// provide to create instances of their identity interface.
pub type IdentityFactory = fn(&toml::Value) -> Result<Box<dyn IdentityInterface>, IdentityError>;

/// Registry trait for identity implementations.
///
/// This trait extends the base ImplementationRegistry to specify that
/// identity implementations must provide an IdentityFactory.
pub trait IdentityRegistry: ImplementationRegistry<Factory = IdentityFactory> {}

/// Get all registered identity implementations.
pub fn get_all_implementations() -> Vec<(&'static str, IdentityFactory)> {
	use implementations::memory;

	vec![(memory::Registry::NAME, memory::Registry::factory())]
}

/// High-level identity service wrapping a backend implementation.
pub struct IdentityService {
	/// The underlying identity backend implementation.
	backend: Box<dyn IdentityInterface>,
}

impl IdentityService {
	/// Creates a new IdentityService with the specified backend.
	pub fn new(backend: Box<dyn IdentityInterface>) -> Self {
		Self { backend }
	}

	/// Looks up a user by id.
	pub async fn get_user(&self, id: &str) -> Result<UserRecord, IdentityError> {
		self.backend.get_user(id).await
	}
}
