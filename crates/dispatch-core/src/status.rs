//! Order status transition rules.
//!
//! The transition graph is data: each status maps to the set of statuses it
//! may move to. Terminal statuses map to the empty set, which is what makes
//! delivered and cancelled orders immutable.

use dispatch_types::OrderStatus;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

// Static transition table - each status maps to allowed next statuses
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		OrderStatus::AwaitingProcessing,
		HashSet::from([
			OrderStatus::DuringTheDeliveryProcess,
			OrderStatus::Cancelled,
		]),
	);
	m.insert(
		OrderStatus::DuringTheDeliveryProcess,
		HashSet::from([OrderStatus::Delivered, OrderStatus::Cancelled]),
	);
	m.insert(OrderStatus::Delivered, HashSet::new()); // terminal
	m.insert(OrderStatus::Cancelled, HashSet::new()); // terminal
	m
});

/// Checks if a status transition is valid.
pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
	TRANSITIONS.get(&from).is_some_and(|set| set.contains(&to))
}

#[cfg(test)]
mod tests {
	use super::*;
	use OrderStatus::*;

	#[test]
	fn allowed_transitions() {
		assert!(is_valid_transition(
			AwaitingProcessing,
			DuringTheDeliveryProcess
		));
		assert!(is_valid_transition(DuringTheDeliveryProcess, Delivered));
		assert!(is_valid_transition(AwaitingProcessing, Cancelled));
		assert!(is_valid_transition(DuringTheDeliveryProcess, Cancelled));
	}

	#[test]
	fn no_skipping_delivery() {
		assert!(!is_valid_transition(AwaitingProcessing, Delivered));
	}

	#[test]
	fn terminal_statuses_are_immutable() {
		for to in [
			AwaitingProcessing,
			DuringTheDeliveryProcess,
			Delivered,
			Cancelled,
		] {
			assert!(!is_valid_transition(Delivered, to));
			assert!(!is_valid_transition(Cancelled, to));
		}
	}

	#[test]
	fn no_backwards_transitions() {
		assert!(!is_valid_transition(
			DuringTheDeliveryProcess,
			AwaitingProcessing
		));
		assert!(!is_valid_transition(Delivered, DuringTheDeliveryProcess));
	}
}
