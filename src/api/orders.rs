//! Order endpoints.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::Result;
use crate::order::{NewOrder, Order, UpdateStatusRequest};
use crate::server::AppState;

use super::response::ApiResponse;

/// GET /api/orders - List all orders in insertion order
#[tracing::instrument(name = "http.list_orders", skip(state))]
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Order>>>> {
    let orders = state.orders.list().await?;
    Ok(Json(ApiResponse::data(orders)))
}

/// POST /api/orders - Save a new order
#[tracing::instrument(name = "http.create_order", skip(state, payload))]
pub async fn create_order(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewOrder>, JsonRejection>,
) -> Result<Json<ApiResponse<Order>>> {
    let Json(request) = payload?;
    let order = state.orders.create(request).await?;

    Ok(Json(
        ApiResponse::data(order).with_message("Order saved successfully"),
    ))
}

/// PUT /api/orders - Change an order's status
#[tracing::instrument(name = "http.update_order_status", skip(state, payload))]
pub async fn update_order_status(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Order>>> {
    let Json(request) = payload?;
    let order = state
        .orders
        .update_status(&request.order_id, request.status)
        .await?;

    Ok(Json(ApiResponse::data(order).with_message("Order status updated")))
}
