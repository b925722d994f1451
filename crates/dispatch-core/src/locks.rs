//! Per-entity locks for lifecycle transitions.
//!
//! Mutual exclusion is scoped to the specific order and courier involved in
//! a transition, so independent orders proceed in parallel. Callers must
//! acquire the order lock before the courier lock; with that single ordering
//! no transition can deadlock. Locks are held only for the duration of one
//! transition, and entries for idle entities are evicted so the maps stay
//! proportional to in-flight work.

use dispatch_storage::{KeyedGuard, KeyedLocks};

/// Keyed async locks for orders and couriers.
pub(crate) struct EntityLocks {
	orders: KeyedLocks,
	couriers: KeyedLocks,
}

impl EntityLocks {
	pub(crate) fn new() -> Self {
		Self {
			orders: KeyedLocks::new(),
			couriers: KeyedLocks::new(),
		}
	}

	/// Locks the named order.
	pub(crate) async fn lock_order(&self, id: &str) -> KeyedGuard {
		self.orders.lock(id).await
	}

	/// Locks the named courier.
	pub(crate) async fn lock_courier(&self, id: &str) -> KeyedGuard {
		self.couriers.lock(id).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;
	use tokio::time::timeout;

	#[tokio::test]
	async fn distinct_ids_do_not_contend() {
		let locks = EntityLocks::new();
		let _held = locks.lock_order("o1").await;

		timeout(Duration::from_millis(50), locks.lock_order("o2"))
			.await
			.expect("independent order must not block");
	}

	#[tokio::test]
	async fn order_and_courier_namespaces_are_separate() {
		let locks = EntityLocks::new();
		let _held = locks.lock_order("x").await;

		timeout(Duration::from_millis(50), locks.lock_courier("x"))
			.await
			.expect("courier lock must not block on order lock");
	}

	#[tokio::test]
	async fn same_id_serializes() {
		let locks = EntityLocks::new();
		let held = locks.lock_order("o1").await;

		assert!(timeout(Duration::from_millis(20), locks.lock_order("o1"))
			.await
			.is_err());

		drop(held);
		timeout(Duration::from_millis(50), locks.lock_order("o1"))
			.await
			.expect("released lock must be acquirable");
	}
}
