//! Courier endpoint handlers.

use crate::apis::map_lifecycle_error;
use dispatch_core::LifecycleManager;
use dispatch_types::{ApiError, Courier, RegisterCourierRequest};

/// Registers a courier record for a user with the courier role.
pub async fn register_courier(
	request: RegisterCourierRequest,
	manager: &LifecycleManager,
) -> Result<Courier, ApiError> {
	manager
		.register_courier(&request.user_id)
		.await
		.map_err(map_lifecycle_error)
}

/// Retrieves a courier record by its identifier.
pub async fn get_courier(id: &str, manager: &LifecycleManager) -> Result<Courier, ApiError> {
	manager.get_courier(id).await.map_err(map_lifecycle_error)
}
