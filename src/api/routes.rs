use axum::{routing::get, Router};

use crate::server::AppState;

use super::health::{health, stats};
use super::metrics::prometheus_metrics;
use super::notifications::{delivery_log, get_settings, notification_action};
use super::orders::{create_order, list_orders, update_order_status};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health, stats & metrics
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(prometheus_metrics))
        // Orders
        .route(
            "/api/orders",
            get(list_orders).post(create_order).put(update_order_status),
        )
        // Notification settings & dispatch
        .route("/api/telegram", get(get_settings).post(notification_action))
        .route("/api/notifications/log", get(delivery_log))
}
