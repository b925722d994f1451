//! Order types for the dispatch system.
//!
//! This module defines the order entity, the enumerated lifecycle status it
//! moves through, and the reference to the single catalog item an order
//! is for.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents one delivery request.
///
/// An order is created by a client action and is thereafter mutated only
/// through lifecycle transitions. Once it reaches a terminal status it is
/// immutable except for read access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier for this order.
	pub id: String,
	/// The user who placed this order.
	pub client_id: String,
	/// Where the order should be delivered. Never empty.
	pub delivery_address: String,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// The single product or combo this order is for.
	pub item: ItemRef,
	/// The courier bound to this order, if one has been assigned.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub courier_id: Option<String>,
	/// Timestamp when this order was created (Unix seconds).
	pub created_at: u64,
	/// Timestamp when this order was last updated (Unix seconds).
	pub updated_at: u64,
}

/// Status of an order in the dispatch system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	/// Order has been placed and is waiting for a courier.
	AwaitingProcessing,
	/// A courier is bound to the order and delivery is underway.
	DuringTheDeliveryProcess,
	/// Order has been delivered. Terminal.
	Delivered,
	/// Order was cancelled before delivery completed. Terminal.
	Cancelled,
}

impl OrderStatus {
	/// Returns true if no further transitions are permitted from this status.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::AwaitingProcessing => write!(f, "awaiting_processing"),
			OrderStatus::DuringTheDeliveryProcess => write!(f, "during_the_delivery_process"),
			OrderStatus::Delivered => write!(f, "delivered"),
			OrderStatus::Cancelled => write!(f, "cancelled"),
		}
	}
}

/// Reference to the single catalog item an order is for.
///
/// Exactly one of a product or a combo; orders never reference both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ItemRef {
	/// A single product, by catalog id.
	Product(String),
	/// A product combo, by catalog id.
	Combo(String),
}

impl ItemRef {
	/// Returns the catalog kind of the referenced item.
	pub fn kind(&self) -> ItemKind {
		match self {
			ItemRef::Product(_) => ItemKind::Product,
			ItemRef::Combo(_) => ItemKind::Combo,
		}
	}

	/// Returns the catalog id of the referenced item.
	pub fn id(&self) -> &str {
		match self {
			ItemRef::Product(id) | ItemRef::Combo(id) => id,
		}
	}
}

/// The kind of catalog item a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
	Product,
	Combo,
}

impl fmt::Display for ItemKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ItemKind::Product => write!(f, "product"),
			ItemKind::Combo => write!(f, "combo"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn terminal_statuses() {
		assert!(!OrderStatus::AwaitingProcessing.is_terminal());
		assert!(!OrderStatus::DuringTheDeliveryProcess.is_terminal());
		assert!(OrderStatus::Delivered.is_terminal());
		assert!(OrderStatus::Cancelled.is_terminal());
	}

	#[test]
	fn item_ref_accessors() {
		let item = ItemRef::Product("5".to_string());
		assert_eq!(item.kind(), ItemKind::Product);
		assert_eq!(item.id(), "5");

		let combo = ItemRef::Combo("12".to_string());
		assert_eq!(combo.kind(), ItemKind::Combo);
		assert_eq!(combo.id(), "12");
	}

	#[test]
	fn status_serializes_as_snake_case() {
		let json = serde_json::to_string(&OrderStatus::DuringTheDeliveryProcess).unwrap();
		assert_eq!(json, "\"during_the_delivery_process\"");
	}
}
