//! In-memory identity implementation seeded from configuration.
//!
//! Useful for development and tests; a production deployment would point the
//! factory at the real user service instead.

use crate::{IdentityError, IdentityFactory, IdentityInterface, IdentityRegistry};
use async_trait::async_trait;
use dispatch_types::{ImplementationRegistry, UserRecord};
use serde::Deserialize;
use std::collections::HashMap;

/// In-memory identity source holding a fixed set of users.
pub struct MemoryIdentity {
	users: HashMap<String, UserRecord>,
}

impl MemoryIdentity {
	/// Creates an identity source from a list of user records.
	pub fn with_users(users: Vec<UserRecord>) -> Self {
		Self {
			users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
		}
	}
}

#[async_trait]
impl IdentityInterface for MemoryIdentity {
	async fn get_user(&self, id: &str) -> Result<UserRecord, IdentityError> {
		self.users
			.get(id)
			.cloned()
			.ok_or_else(|| IdentityError::UserNotFound(id.to_string()))
	}
}

/// Configuration for the memory identity implementation.
#[derive(Debug, Deserialize)]
struct MemoryIdentityConfig {
	/// Seed users, e.g. `users = [{ id = "1", role = "client" }]`.
	#[serde(default)]
	users: Vec<UserRecord>,
}

/// Registry for the memory identity implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = IdentityFactory;

	fn factory() -> Self::Factory {
		create_identity
	}
}

impl IdentityRegistry for Registry {}

/// Factory function to create a memory identity source from configuration.
///
/// Configuration parameters:
/// - `users`: array of `{ id, role }` tables to seed
pub fn create_identity(
	config: &toml::Value,
) -> Result<Box<dyn IdentityInterface>, IdentityError> {
	let config: MemoryIdentityConfig = config
		.clone()
		.try_into()
		.map_err(|e: toml::de::Error| IdentityError::Configuration(e.message().to_string()))?;

	Ok(Box::new(MemoryIdentity::with_users(config.users)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use dispatch_types::UserRole;

	#[tokio::test]
	async fn test_lookup() {
		let identity = MemoryIdentity::with_users(vec![UserRecord {
			id: "7".to_string(),
			role: UserRole::Courier,
		}]);

		let user = identity.get_user("7").await.unwrap();
		assert_eq!(user.role, UserRole::Courier);

		let missing = identity.get_user("8").await;
		assert!(matches!(missing, Err(IdentityError::UserNotFound(_))));
	}

	#[tokio::test]
	async fn test_factory_from_toml() {
		let config: toml::Value = toml::from_str(
			r#"
			users = [
				{ id = "1", role = "client" },
				{ id = "7", role = "courier" },
			]
			"#,
		)
		.unwrap();

		let identity = create_identity(&config).unwrap();
		let user = identity.get_user("1").await.unwrap();
		assert_eq!(user.role, UserRole::Client);
	}
}
