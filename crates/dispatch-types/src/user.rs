//! User identity types returned by the identity collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A user as seen by the dispatch core.
///
/// Only the fields the lifecycle manager needs for reference validation;
/// profile data stays with the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
	/// Unique identifier for this user.
	pub id: String,
	/// The user's role in the marketplace.
	pub role: UserRole,
}

/// Role of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
	/// A customer who places orders.
	Client,
	/// A store owner.
	Owner,
	/// A delivery agent.
	Courier,
}

impl fmt::Display for UserRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			UserRole::Client => write!(f, "client"),
			UserRole::Owner => write!(f, "owner"),
			UserRole::Courier => write!(f, "courier"),
		}
	}
}
