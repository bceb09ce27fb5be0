//! API layer - HTTP endpoint handlers organized by domain.

mod health;
mod metrics;
mod notifications;
mod orders;
mod response;
mod routes;

// Re-export handlers for use in server/app.rs
pub use health::{health, stats};
pub use metrics::prometheus_metrics;
pub use notifications::{delivery_log, get_settings, notification_action, NotificationAction};
pub use orders::{create_order, list_orders, update_order_status};
pub use response::{ApiResponse, SendNotificationResponse, TestNotificationResponse};
pub use routes::api_routes;
