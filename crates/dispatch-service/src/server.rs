//! HTTP server for the dispatch API.
//!
//! This module provides a minimal HTTP server exposing the order lifecycle
//! operations as REST endpoints.

use crate::apis;
use axum::{
	extract::{Path, State},
	response::Json,
	routing::{get, post},
	Router,
};
use dispatch_config::ApiConfig;
use dispatch_core::LifecycleManager;
use dispatch_types::{
	ApiError, AssignCourierRequest, CancelOrderRequest, Courier, MarkDeliveredRequest, Order,
	PlaceOrderRequest, RegisterCourierRequest,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the lifecycle manager for processing requests.
	pub manager: Arc<LifecycleManager>,
}

/// Starts the HTTP server for the API.
///
/// This function creates and configures the HTTP server with routing,
/// middleware, and error handling for the lifecycle endpoints.
pub async fn start_server(
	api_config: ApiConfig,
	manager: Arc<LifecycleManager>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app_state = AppState { manager };

	// Build the router with /api base path
	let app = Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/orders", post(handle_place_order))
				.route("/orders/{id}", get(handle_get_order))
				.route("/orders/{id}/assign", post(handle_assign_courier))
				.route("/orders/{id}/delivered", post(handle_mark_delivered))
				.route("/orders/{id}/cancel", post(handle_cancel_order))
				.route("/couriers", post(handle_register_courier))
				.route("/couriers/{id}", get(handle_get_courier)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(app_state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Dispatch API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles POST /api/orders requests.
async fn handle_place_order(
	State(state): State<AppState>,
	Json(request): Json<PlaceOrderRequest>,
) -> Result<Json<Order>, ApiError> {
	match apis::order::place_order(request, &state.manager).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Order placement failed: {}", e);
			Err(e)
		}
	}
}

/// Handles GET /api/orders/{id} requests.
async fn handle_get_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Order>, ApiError> {
	match apis::order::get_order(&id, &state.manager).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Order retrieval failed: {}", e);
			Err(e)
		}
	}
}

/// Handles POST /api/orders/{id}/assign requests.
async fn handle_assign_courier(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(request): Json<AssignCourierRequest>,
) -> Result<Json<Order>, ApiError> {
	match apis::order::assign_courier(&id, request, &state.manager).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Courier assignment failed: {}", e);
			Err(e)
		}
	}
}

/// Handles POST /api/orders/{id}/delivered requests.
async fn handle_mark_delivered(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(request): Json<MarkDeliveredRequest>,
) -> Result<Json<Order>, ApiError> {
	match apis::order::mark_delivered(&id, request, &state.manager).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Delivery confirmation failed: {}", e);
			Err(e)
		}
	}
}

/// Handles POST /api/orders/{id}/cancel requests.
async fn handle_cancel_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(request): Json<CancelOrderRequest>,
) -> Result<Json<Order>, ApiError> {
	match apis::order::cancel_order(&id, request, &state.manager).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Order cancellation failed: {}", e);
			Err(e)
		}
	}
}

/// Handles POST /api/couriers requests.
async fn handle_register_courier(
	State(state): State<AppState>,
	Json(request): Json<RegisterCourierRequest>,
) -> Result<Json<Courier>, ApiError> {
	match apis::courier::register_courier(request, &state.manager).await {
		Ok(courier) => Ok(Json(courier)),
		Err(e) => {
			tracing::warn!("Courier registration failed: {}", e);
			Err(e)
		}
	}
}

/// Handles GET /api/couriers/{id} requests.
async fn handle_get_courier(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Courier>, ApiError> {
	match apis::courier::get_courier(&id, &state.manager).await {
		Ok(courier) => Ok(Json(courier)),
		Err(e) => {
			tracing::warn!("Courier retrieval failed: {}", e);
			Err(e)
		}
	}
}
