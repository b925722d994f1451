//! Courier types for the dispatch system.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a delivery agent's availability and current assignment.
///
/// A courier record is created when a user with the courier role registers.
/// Its availability flips only as a side effect of order assignment,
/// completion, or cancellation, never by direct external write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Courier {
	/// Unique identifier for this courier record.
	pub id: String,
	/// The underlying user, who must have the courier role.
	pub user_id: String,
	/// Whether this courier can currently take an order.
	pub availability: CourierAvailability,
	/// The order this courier is currently delivering, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub current_order: Option<String>,
	/// Timestamp when this courier registered (Unix seconds).
	pub created_at: u64,
	/// Timestamp when this courier was last updated (Unix seconds).
	pub updated_at: u64,
}

impl Courier {
	/// Checks the availability invariant: a courier is employed if and only
	/// if it currently has an order bound.
	pub fn is_consistent(&self) -> bool {
		match self.availability {
			CourierAvailability::Employed => self.current_order.is_some(),
			CourierAvailability::Available => self.current_order.is_none(),
		}
	}
}

/// Availability state of a courier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourierAvailability {
	/// The courier can be bound to a new order.
	Available,
	/// The courier is delivering an order and cannot take another.
	Employed,
}

impl fmt::Display for CourierAvailability {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CourierAvailability::Available => write!(f, "available"),
			CourierAvailability::Employed => write!(f, "employed"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn courier(availability: CourierAvailability, current_order: Option<&str>) -> Courier {
		Courier {
			id: "c1".to_string(),
			user_id: "u1".to_string(),
			availability,
			current_order: current_order.map(String::from),
			created_at: 0,
			updated_at: 0,
		}
	}

	#[test]
	fn availability_invariant() {
		assert!(courier(CourierAvailability::Available, None).is_consistent());
		assert!(courier(CourierAvailability::Employed, Some("o1")).is_consistent());
		assert!(!courier(CourierAvailability::Employed, None).is_consistent());
		assert!(!courier(CourierAvailability::Available, Some("o1")).is_consistent());
	}
}
