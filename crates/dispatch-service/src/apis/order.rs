//! Order endpoint handlers.

use crate::apis::map_lifecycle_error;
use dispatch_core::LifecycleManager;
use dispatch_types::{
	ApiError, AssignCourierRequest, CancelOrderRequest, MarkDeliveredRequest, Order,
	PlaceOrderRequest,
};

/// Places a new order on behalf of a client.
pub async fn place_order(
	request: PlaceOrderRequest,
	manager: &LifecycleManager,
) -> Result<Order, ApiError> {
	manager
		.place_order(&request.client_id, &request.delivery_address, request.item)
		.await
		.map_err(map_lifecycle_error)
}

/// Retrieves an order by its identifier.
pub async fn get_order(id: &str, manager: &LifecycleManager) -> Result<Order, ApiError> {
	manager.get_order(id).await.map_err(map_lifecycle_error)
}

/// Binds a courier to an awaiting order.
pub async fn assign_courier(
	order_id: &str,
	request: AssignCourierRequest,
	manager: &LifecycleManager,
) -> Result<Order, ApiError> {
	manager
		.assign_courier(order_id, &request.courier_id)
		.await
		.map_err(map_lifecycle_error)
}

/// Marks an order as delivered by its bound courier.
pub async fn mark_delivered(
	order_id: &str,
	request: MarkDeliveredRequest,
	manager: &LifecycleManager,
) -> Result<Order, ApiError> {
	manager
		.mark_delivered(order_id, &request.courier_id)
		.await
		.map_err(map_lifecycle_error)
}

/// Cancels an order on behalf of its client or bound courier.
pub async fn cancel_order(
	order_id: &str,
	request: CancelOrderRequest,
	manager: &LifecycleManager,
) -> Result<Order, ApiError> {
	manager
		.cancel_order(order_id, &request.actor_id)
		.await
		.map_err(map_lifecycle_error)
}
