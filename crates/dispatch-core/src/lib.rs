//! Core lifecycle engine for the dispatch system.
//!
//! This module owns the order/courier lifecycle: the state machine moving an
//! order from placement to delivery, courier assignment with conflict
//! prevention, and the release side effects that keep courier availability
//! consistent. Persistence, identity, and catalog lookups are injected
//! collaborators; all transitions are synchronous request/response
//! operations with no background work.

use dispatch_types::OrderStatus;
use thiserror::Error;

mod locks;
mod manager;
mod status;

pub use manager::LifecycleManager;
pub use status::is_valid_transition;

/// Utility function to truncate an id for display purposes.
///
/// Shows only the first 8 characters followed by ".." for longer strings.
/// Ids come from request paths, so truncation must respect char boundaries.
pub(crate) fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(8) {
		Some((idx, _)) => format!("{}..", &id[..idx]),
		None => id.to_string(),
	}
}

/// Errors that can occur during lifecycle operations.
///
/// Every failure is reported synchronously to the caller; the engine never
/// retries on its own. A `Conflict` tells the caller it lost a race and may
/// retry with fresh state if it wants to.
#[derive(Debug, Error)]
pub enum LifecycleError {
	/// A referenced user, courier, item, or order does not exist.
	#[error("Unknown reference: {0}")]
	InvalidReference(String),
	/// Malformed input, such as an empty delivery address.
	#[error("Validation failed: {0}")]
	Validation(String),
	/// The requested transition is not legal from the current status.
	#[error("Invalid state transition from {from} to {to}")]
	InvalidStateTransition { from: OrderStatus, to: OrderStatus },
	/// Lost a race for an exclusive state change.
	#[error("Conflict: {0}")]
	Conflict(String),
	/// The acting party is not authorized for this mutation.
	#[error("Forbidden: {0}")]
	Forbidden(String),
	/// Error from the persistence collaborator.
	#[error("Storage error: {0}")]
	Storage(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truncates_long_ids() {
		assert_eq!(truncate_id("short"), "short");
		assert_eq!(
			truncate_id("0a1b2c3d-4e5f-6789-abcd-ef0123456789"),
			"0a1b2c3d.."
		);
	}

	#[test]
	fn truncates_on_char_boundaries() {
		assert_eq!(truncate_id("aaaaaaaé-order"), "aaaaaaaé..");
		assert_eq!(truncate_id("éééééééé"), "éééééééé");
	}
}
