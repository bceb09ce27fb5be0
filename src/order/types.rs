use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Order processing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, waiting for a seller (default)
    #[default]
    Pending,
    /// Handed over to the customer
    Completed,
    /// Cancelled by a seller
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    /// Line total (unit price × quantity)
    pub total: f64,
}

/// A marketplace order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order identifier
    pub id: String,
    /// Ordered items, immutable after creation
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Customer nickname
    pub nickname: String,
    pub total_price: f64,
    /// Order time as shown to sellers
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Any additional fields supplied by the storefront, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request to create a new order
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Explicit identifier (generated when absent or empty)
    #[serde(default)]
    pub id: Option<String>,
    pub items: Vec<OrderItem>,
    pub nickname: String,
    pub total_price: f64,
    /// Display time (defaults to the creation time)
    #[serde(default)]
    pub time: Option<String>,
    /// Initial status (defaults to pending)
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewOrder {
    /// Minimal order request without an explicit id
    pub fn new(nickname: impl Into<String>, items: Vec<OrderItem>) -> Self {
        let total_price = items.iter().map(|item| item.total).sum();
        Self {
            id: None,
            items,
            nickname: nickname.into(),
            total_price,
            time: None,
            status: None,
            extra: Map::new(),
        }
    }

    /// Set an explicit id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Request to change an order's status
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub order_id: String,
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_value(OrderStatus::Cancelled).unwrap(), json!("cancelled"));
        let status: OrderStatus = serde_json::from_value(json!("completed")).unwrap();
        assert_eq!(status, OrderStatus::Completed);
        assert!(serde_json::from_value::<OrderStatus>(json!("shipped")).is_err());
    }

    #[test]
    fn test_order_keeps_extra_fields() {
        let order: Order = serde_json::from_value(json!({
            "id": "42",
            "items": [{"name": "Helmet", "quantity": 1, "total": 300.0}],
            "nickname": "Ann",
            "totalPrice": 300.0,
            "time": "12:00",
            "status": "pending",
            "createdAt": "2026-01-01T00:00:00Z",
            "server": "eu-1"
        }))
        .unwrap();

        assert_eq!(order.extra.get("server"), Some(&json!("eu-1")));

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["server"], "eu-1");
        assert_eq!(value["totalPrice"], 300.0);
        assert!(value.get("updatedAt").is_none());
    }

    #[test]
    fn test_new_order_sums_items() {
        let order = NewOrder::new(
            "Ann",
            vec![
                OrderItem { name: "A".into(), quantity: 1, total: 10.0 },
                OrderItem { name: "B".into(), quantity: 2, total: 5.5 },
            ],
        );
        assert_eq!(order.total_price, 15.5);
        assert!(order.id.is_none());
    }
}
