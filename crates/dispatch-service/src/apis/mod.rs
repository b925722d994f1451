//! API handler implementations for lifecycle endpoints.
//!
//! Each submodule contains the request handlers for one resource. Handlers
//! delegate to the lifecycle manager and translate its errors into the
//! HTTP-facing error type.

pub mod courier;
pub mod order;

use dispatch_core::LifecycleError;
use dispatch_types::ApiError;

/// Maps a lifecycle error onto the HTTP error surface.
pub(crate) fn map_lifecycle_error(e: LifecycleError) -> ApiError {
	match e {
		LifecycleError::InvalidReference(_) => ApiError::NotFound {
			error_type: "UNKNOWN_REFERENCE".to_string(),
			message: e.to_string(),
		},
		LifecycleError::Validation(_) => ApiError::BadRequest {
			error_type: "VALIDATION_FAILED".to_string(),
			message: e.to_string(),
			details: None,
		},
		LifecycleError::Forbidden(_) => ApiError::Forbidden {
			error_type: "FORBIDDEN".to_string(),
			message: e.to_string(),
		},
		LifecycleError::Conflict(_) => ApiError::Conflict {
			error_type: "ASSIGNMENT_CONFLICT".to_string(),
			message: e.to_string(),
		},
		LifecycleError::InvalidStateTransition { .. } => ApiError::UnprocessableEntity {
			error_type: "INVALID_STATE_TRANSITION".to_string(),
			message: e.to_string(),
			details: None,
		},
		LifecycleError::Storage(_) => ApiError::InternalServerError {
			error_type: "INTERNAL_ERROR".to_string(),
			message: e.to_string(),
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use dispatch_types::OrderStatus;

	#[test]
	fn lifecycle_errors_map_to_expected_statuses() {
		let cases = vec![
			(
				map_lifecycle_error(LifecycleError::InvalidReference("unknown order: o1".into())),
				404,
			),
			(
				map_lifecycle_error(LifecycleError::Validation("delivery address is empty".into())),
				400,
			),
			(
				map_lifecycle_error(LifecycleError::Forbidden("courier c2 is not assigned".into())),
				403,
			),
			(
				map_lifecycle_error(LifecycleError::Conflict("courier c1 is already employed".into())),
				409,
			),
			(
				map_lifecycle_error(LifecycleError::InvalidStateTransition {
					from: OrderStatus::Delivered,
					to: OrderStatus::Cancelled,
				}),
				422,
			),
			(
				map_lifecycle_error(LifecycleError::Storage("backend unavailable".into())),
				500,
			),
		];

		for (error, expected) in cases {
			assert_eq!(error.status_code(), expected);
		}
	}
}
