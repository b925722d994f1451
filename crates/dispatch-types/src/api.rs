//! API types for the dispatch HTTP API.
//!
//! This module defines the request and response types for the lifecycle
//! endpoints, plus the structured error type that maps failures onto
//! HTTP status codes.

use crate::ItemRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request to place a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
	/// The user placing the order.
	pub client_id: String,
	/// Where the order should be delivered.
	pub delivery_address: String,
	/// The product or combo being ordered.
	pub item: ItemRef,
}

/// Request to register a courier record for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCourierRequest {
	/// The user to register. Must have the courier role.
	pub user_id: String,
}

/// Request to bind a courier to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignCourierRequest {
	/// The courier record to bind.
	pub courier_id: String,
}

/// Request to mark an order as delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkDeliveredRequest {
	/// The courier reporting delivery. Must be the bound courier.
	pub courier_id: String,
}

/// Request to cancel an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelOrderRequest {
	/// The user or courier requesting cancellation.
	pub actor_id: String,
}

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Additional error context
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Referenced entity does not exist (404)
	NotFound { error_type: String, message: String },
	/// Malformed input (400)
	BadRequest {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Actor is not authorized for this mutation (403)
	Forbidden { error_type: String, message: String },
	/// Lost a race for an exclusive state change (409)
	Conflict { error_type: String, message: String },
	/// Operation is not legal from the current state (422)
	UnprocessableEntity {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::NotFound { .. } => 404,
			ApiError::BadRequest { .. } => 400,
			ApiError::Forbidden { .. } => 403,
			ApiError::Conflict { .. } => 409,
			ApiError::UnprocessableEntity { .. } => 422,
			ApiError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			ApiError::NotFound {
				error_type,
				message,
			}
			| ApiError::Forbidden {
				error_type,
				message,
			}
			| ApiError::Conflict {
				error_type,
				message,
			}
			| ApiError::InternalServerError {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
			},
			ApiError::BadRequest {
				error_type,
				message,
				details,
			}
			| ApiError::UnprocessableEntity {
				error_type,
				message,
				details,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: details.clone(),
			},
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			ApiError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			ApiError::Forbidden { message, .. } => write!(f, "Forbidden: {}", message),
			ApiError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
			ApiError::UnprocessableEntity { message, .. } => {
				write!(f, "Unprocessable Entity: {}", message)
			}
			ApiError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			}
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status, Json(self.to_error_response())).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_codes() {
		let err = ApiError::Conflict {
			error_type: "ASSIGNMENT_CONFLICT".to_string(),
			message: "lost the race".to_string(),
		};
		assert_eq!(err.status_code(), 409);
		assert_eq!(err.to_error_response().error, "ASSIGNMENT_CONFLICT");
	}
}
