//! Order lifecycle manager.
//!
//! Implements the transition operations over injected storage, identity,
//! and catalog collaborators. Each transition acquires the per-entity locks
//! for the records it touches, re-validates preconditions under the locks,
//! and commits with version-checked writes so a concurrent writer in
//! another process still surfaces as a conflict rather than a lost update.

use crate::locks::EntityLocks;
use crate::status::is_valid_transition;
use crate::{truncate_id, LifecycleError};
use dispatch_catalog::CatalogService;
use dispatch_identity::{IdentityError, IdentityService};
use dispatch_storage::{StorageError, StorageService, Versioned};
use dispatch_types::{
	Courier, CourierAvailability, ItemRef, Order, OrderStatus, StorageKey, UserRole,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// A courier write staged as part of a two-record commit.
///
/// Carries the prior record so a failed order write can be compensated.
/// Owned, because the commit outlives the caller's future.
struct CourierWrite {
	updated: Courier,
	prior: Courier,
	/// Version the prior record was read at.
	version: u64,
}

/// Owns the order/courier state machine.
///
/// Collaborators are injected at construction; the manager holds no global
/// state beyond its lock maps, so independent orders never interfere.
pub struct LifecycleManager {
	storage: Arc<StorageService>,
	identity: Arc<IdentityService>,
	catalog: Arc<CatalogService>,
	locks: EntityLocks,
}

impl LifecycleManager {
	/// Creates a new LifecycleManager over the given collaborators.
	pub fn new(
		storage: Arc<StorageService>,
		identity: Arc<IdentityService>,
		catalog: Arc<CatalogService>,
	) -> Self {
		Self {
			storage,
			identity,
			catalog,
			locks: EntityLocks::new(),
		}
	}

	/// Creates an order in `awaiting_processing` for an existing client and
	/// catalog item. No courier is assigned at this point.
	#[instrument(skip(self, delivery_address))]
	pub async fn place_order(
		&self,
		client_id: &str,
		delivery_address: &str,
		item: ItemRef,
	) -> Result<Order, LifecycleError> {
		if delivery_address.trim().is_empty() {
			return Err(LifecycleError::Validation(
				"delivery address must not be empty".to_string(),
			));
		}

		self.identity
			.get_user(client_id)
			.await
			.map_err(map_identity_error)?;

		let exists = self
			.catalog
			.item_exists(item.kind(), item.id())
			.await
			.map_err(|e| LifecycleError::Storage(e.to_string()))?;
		if !exists {
			return Err(LifecycleError::InvalidReference(format!(
				"unknown {}: {}",
				item.kind(),
				item.id()
			)));
		}

		let now = now_secs();
		let order = Order {
			id: Uuid::new_v4().to_string(),
			client_id: client_id.to_string(),
			delivery_address: delivery_address.to_string(),
			status: OrderStatus::AwaitingProcessing,
			item,
			courier_id: None,
			created_at: now,
			updated_at: now,
		};

		self.storage
			.store_new(StorageKey::Orders, &order.id, &order)
			.await
			.map_err(|e| LifecycleError::Storage(e.to_string()))?;

		tracing::info!(
			order_id = %truncate_id(&order.id),
			client_id = %client_id,
			"Order placed"
		);
		Ok(order)
	}

	/// Creates an `available` courier record for a user with the courier
	/// role. A user can have at most one courier record.
	#[instrument(skip(self))]
	pub async fn register_courier(&self, user_id: &str) -> Result<Courier, LifecycleError> {
		let user = self
			.identity
			.get_user(user_id)
			.await
			.map_err(map_identity_error)?;
		if user.role != UserRole::Courier {
			return Err(LifecycleError::Validation(format!(
				"user {} has role {}, expected courier",
				user_id, user.role
			)));
		}

		let now = now_secs();
		let courier = Courier {
			id: Uuid::new_v4().to_string(),
			user_id: user_id.to_string(),
			availability: CourierAvailability::Available,
			current_order: None,
			created_at: now,
			updated_at: now,
		};

		// The user-id marker doubles as the uniqueness check.
		match self
			.storage
			.store_new(StorageKey::CourierByUser, user_id, &courier.id)
			.await
		{
			Ok(_) => {}
			Err(StorageError::AlreadyExists) => {
				return Err(LifecycleError::Conflict(format!(
					"user {} already has a courier record",
					user_id
				)))
			}
			Err(e) => return Err(LifecycleError::Storage(e.to_string())),
		}

		if let Err(e) = self
			.storage
			.store_new(StorageKey::Couriers, &courier.id, &courier)
			.await
		{
			if let Err(cleanup) = self.storage.remove(StorageKey::CourierByUser, user_id).await {
				tracing::error!(
					user_id = %user_id,
					error = %cleanup,
					"Failed to remove courier marker after registration failure"
				);
			}
			return Err(LifecycleError::Storage(e.to_string()));
		}

		tracing::info!(
			courier_id = %truncate_id(&courier.id),
			user_id = %user_id,
			"Courier registered"
		);
		Ok(courier)
	}

	/// Binds an available courier to an awaiting order, moving the order to
	/// `during_the_delivery_process` and the courier to `employed`.
	///
	/// At most one assignment can succeed per order, and a courier can hold
	/// at most one active order; racing callers get exactly one winner and
	/// the losers a `Conflict`.
	#[instrument(skip(self), fields(order_id = %truncate_id(order_id), courier_id = %truncate_id(courier_id)))]
	pub async fn assign_courier(
		&self,
		order_id: &str,
		courier_id: &str,
	) -> Result<Order, LifecycleError> {
		// Snapshot versions before locking; used below to tell a lost race
		// apart from a request that was never legal.
		let order_snapshot = self.load_order(order_id).await?;
		self.load_courier(courier_id).await?;

		let _order_guard = self.locks.lock_order(order_id).await;
		let _courier_guard = self.locks.lock_courier(courier_id).await;

		let order = self.load_order(order_id).await?;
		let courier = self.load_courier(courier_id).await?;

		if !is_valid_transition(order.value.status, OrderStatus::DuringTheDeliveryProcess) {
			if order.version != order_snapshot.version {
				return Err(LifecycleError::Conflict(format!(
					"order {} was assigned concurrently",
					order_id
				)));
			}
			return Err(LifecycleError::InvalidStateTransition {
				from: order.value.status,
				to: OrderStatus::DuringTheDeliveryProcess,
			});
		}
		if courier.value.availability == CourierAvailability::Employed {
			return Err(LifecycleError::Conflict(format!(
				"courier {} is already employed",
				courier_id
			)));
		}

		let now = now_secs();
		let mut updated_order = order.value.clone();
		updated_order.status = OrderStatus::DuringTheDeliveryProcess;
		updated_order.courier_id = Some(courier.value.id.clone());
		updated_order.updated_at = now;

		let mut updated_courier = courier.value.clone();
		updated_courier.availability = CourierAvailability::Employed;
		updated_courier.current_order = Some(updated_order.id.clone());
		updated_courier.updated_at = now;

		self.commit(
			updated_order.clone(),
			order.version,
			Some(CourierWrite {
				updated: updated_courier,
				prior: courier.value,
				version: courier.version,
			}),
		)
		.await?;

		tracing::info!("Courier assigned");
		Ok(updated_order)
	}

	/// Completes an order. Only the bound courier may report delivery; the
	/// courier is released as a side effect.
	#[instrument(skip(self), fields(order_id = %truncate_id(order_id), courier_id = %truncate_id(courier_id)))]
	pub async fn mark_delivered(
		&self,
		order_id: &str,
		courier_id: &str,
	) -> Result<Order, LifecycleError> {
		let _order_guard = self.locks.lock_order(order_id).await;

		let order = self.load_order(order_id).await?;
		if !is_valid_transition(order.value.status, OrderStatus::Delivered) {
			return Err(LifecycleError::InvalidStateTransition {
				from: order.value.status,
				to: OrderStatus::Delivered,
			});
		}

		let bound = order.value.courier_id.clone().ok_or_else(|| {
			LifecycleError::Storage(format!(
				"order {} is in delivery but has no courier bound",
				order_id
			))
		})?;
		if bound != courier_id {
			return Err(LifecycleError::Forbidden(format!(
				"courier {} is not assigned to order {}",
				courier_id, order_id
			)));
		}

		let _courier_guard = self.locks.lock_courier(&bound).await;
		let courier = self.load_bound_courier(&bound).await?;

		let now = now_secs();
		let mut updated_order = order.value.clone();
		updated_order.status = OrderStatus::Delivered;
		updated_order.updated_at = now;

		let released = release_courier(&courier.value, now);

		self.commit(
			updated_order.clone(),
			order.version,
			Some(CourierWrite {
				updated: released,
				prior: courier.value,
				version: courier.version,
			}),
		)
		.await?;

		tracing::info!("Order delivered");
		Ok(updated_order)
	}

	/// Cancels a non-terminal order, releasing the courier if one was
	/// assigned. Terminal orders are immutable: cancelling one fails with
	/// an invalid-transition error rather than succeeding silently.
	///
	/// The placing client and the bound courier may cancel; anyone else is
	/// rejected.
	#[instrument(skip(self), fields(order_id = %truncate_id(order_id), actor_id = %truncate_id(actor_id)))]
	pub async fn cancel_order(
		&self,
		order_id: &str,
		actor_id: &str,
	) -> Result<Order, LifecycleError> {
		let _order_guard = self.locks.lock_order(order_id).await;

		let order = self.load_order(order_id).await?;
		if !is_valid_transition(order.value.status, OrderStatus::Cancelled) {
			return Err(LifecycleError::InvalidStateTransition {
				from: order.value.status,
				to: OrderStatus::Cancelled,
			});
		}

		let authorized = order.value.client_id == actor_id
			|| order.value.courier_id.as_deref() == Some(actor_id);
		if !authorized {
			return Err(LifecycleError::Forbidden(format!(
				"{} may not cancel order {}",
				actor_id, order_id
			)));
		}

		let now = now_secs();
		let mut updated_order = order.value.clone();
		updated_order.status = OrderStatus::Cancelled;
		updated_order.updated_at = now;

		match order.value.courier_id.clone() {
			Some(bound) => {
				let _courier_guard = self.locks.lock_courier(&bound).await;
				let courier = self.load_bound_courier(&bound).await?;
				let released = release_courier(&courier.value, now);

				self.commit(
					updated_order.clone(),
					order.version,
					Some(CourierWrite {
						updated: released,
						prior: courier.value,
						version: courier.version,
					}),
				)
				.await?;
			}
			None => {
				self.commit(updated_order.clone(), order.version, None)
					.await?;
			}
		}

		tracing::info!("Order cancelled");
		Ok(updated_order)
	}

	/// Gets an order by id. Terminal orders stay readable.
	pub async fn get_order(&self, order_id: &str) -> Result<Order, LifecycleError> {
		Ok(self.load_order(order_id).await?.value)
	}

	/// Gets a courier by id.
	pub async fn get_courier(&self, courier_id: &str) -> Result<Courier, LifecycleError> {
		Ok(self.load_courier(courier_id).await?.value)
	}

	async fn load_order(&self, order_id: &str) -> Result<Versioned<Order>, LifecycleError> {
		self.storage
			.retrieve(StorageKey::Orders, order_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => {
					LifecycleError::InvalidReference(format!("unknown order: {}", order_id))
				}
				other => LifecycleError::Storage(other.to_string()),
			})
	}

	async fn load_courier(&self, courier_id: &str) -> Result<Versioned<Courier>, LifecycleError> {
		self.storage
			.retrieve(StorageKey::Couriers, courier_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => {
					LifecycleError::InvalidReference(format!("unknown courier: {}", courier_id))
				}
				other => LifecycleError::Storage(other.to_string()),
			})
	}

	/// Loads the courier an order points at. Absence here is an invariant
	/// breach, not a bad reference from the caller.
	async fn load_bound_courier(
		&self,
		courier_id: &str,
	) -> Result<Versioned<Courier>, LifecycleError> {
		self.storage
			.retrieve(StorageKey::Couriers, courier_id)
			.await
			.map_err(|e| LifecycleError::Storage(e.to_string()))
	}

	/// Commits a transition touching one order and optionally one courier.
	///
	/// The courier record is written first and compensated if the order
	/// write fails. The write pair runs on its own task, awaited for its
	/// result, so a caller dropped mid-commit cannot strand a half-updated
	/// pair: the task runs to completion either way. The version-checked
	/// writes keep a concurrent transition that sneaks in between the two
	/// writes from being overwritten.
	async fn commit(
		&self,
		order: Order,
		order_version: u64,
		courier: Option<CourierWrite>,
	) -> Result<(), LifecycleError> {
		let storage = Arc::clone(&self.storage);
		let task = tokio::spawn(async move {
			let staged = match courier {
				Some(write) => {
					let new_version = storage
						.update(
							StorageKey::Couriers,
							&write.updated.id,
							&write.updated,
							write.version,
						)
						.await
						.map_err(|e| map_commit_error("courier", &write.updated.id, e))?;
					Some((write, new_version))
				}
				None => None,
			};

			if let Err(e) = storage
				.update(StorageKey::Orders, &order.id, &order, order_version)
				.await
			{
				if let Some((write, new_version)) = staged {
					if let Err(rollback) = storage
						.update(
							StorageKey::Couriers,
							&write.updated.id,
							&write.prior,
							new_version,
						)
						.await
					{
						tracing::error!(
							courier_id = %truncate_id(&write.updated.id),
							order_id = %truncate_id(&order.id),
							error = %rollback,
							"Failed to roll back courier after order commit failure"
						);
					}
				}
				return Err(map_commit_error("order", &order.id, e));
			}

			Ok(())
		});

		task.await
			.map_err(|e| LifecycleError::Storage(format!("commit task failed: {}", e)))?
	}
}

/// Returns a copy of the courier with its assignment cleared.
fn release_courier(courier: &Courier, now: u64) -> Courier {
	let mut released = courier.clone();
	released.availability = CourierAvailability::Available;
	released.current_order = None;
	released.updated_at = now;
	released
}

fn now_secs() -> u64 {
	chrono::Utc::now().timestamp().max(0) as u64
}

fn map_identity_error(e: IdentityError) -> LifecycleError {
	match e {
		IdentityError::UserNotFound(id) => {
			LifecycleError::InvalidReference(format!("unknown user: {}", id))
		}
		other => LifecycleError::Storage(other.to_string()),
	}
}

fn map_commit_error(entity: &str, id: &str, e: StorageError) -> LifecycleError {
	match e {
		StorageError::Conflict { .. } => LifecycleError::Conflict(format!(
			"{} {} was modified concurrently",
			entity,
			truncate_id(id)
		)),
		other => LifecycleError::Storage(other.to_string()),
	}
}
