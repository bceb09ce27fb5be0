use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::metrics::OrderMetrics;
use crate::storage::{OrderStore, StoreHandle};
use crate::utils::human_time;

use super::{NewOrder, Order, OrderError, OrderResult, OrderStatus};

/// Creates and updates order records.
///
/// All mutations run through the order collection's single-writer handle.
pub struct OrderManager {
    orders: StoreHandle<Vec<Order>>,
}

impl OrderManager {
    pub fn new(store: Arc<OrderStore>) -> Self {
        Self {
            orders: StoreHandle::new(store),
        }
    }

    /// Append a new order to the collection.
    ///
    /// An absent or empty id is replaced by a UUIDv7 (time-ordered prefix,
    /// random suffix). An explicit id is kept verbatim but must not exist yet.
    #[tracing::instrument(name = "orders.create", skip(self, request), fields(nickname = %request.nickname))]
    pub async fn create(&self, request: NewOrder) -> OrderResult<Order> {
        let now = Utc::now();
        let NewOrder {
            id,
            items,
            nickname,
            total_price,
            time,
            status,
            mut extra,
        } = request;

        // Server-owned timestamps are never taken from the client
        extra.remove("createdAt");
        extra.remove("updatedAt");

        let order = Order {
            id: id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| Uuid::now_v7().to_string()),
            items,
            nickname,
            total_price,
            time: time.unwrap_or_else(|| human_time(now)),
            status: status.unwrap_or_default(),
            created_at: now,
            updated_at: None,
            extra,
        };

        let created = self
            .orders
            .update(|orders| {
                if orders.iter().any(|existing| existing.id == order.id) {
                    return Err(OrderError::AlreadyExists(order.id.clone()));
                }
                orders.push(order.clone());
                Ok(order)
            })
            .await?;

        OrderMetrics::record_created();
        tracing::info!(order_id = %created.id, "Order created");

        Ok(created)
    }

    /// Set the status of an existing order.
    ///
    /// Unknown ids fail with [`OrderError::NotFound`] and leave the collection untouched.
    #[tracing::instrument(name = "orders.update_status", skip(self))]
    pub async fn update_status(&self, order_id: &str, status: OrderStatus) -> OrderResult<Order> {
        let updated = self
            .orders
            .update(|orders| {
                let order = orders
                    .iter_mut()
                    .find(|o| o.id == order_id)
                    .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;

                order.status = status;
                order.updated_at = Some(Utc::now());
                Ok::<_, OrderError>(order.clone())
            })
            .await?;

        OrderMetrics::record_status_update(status);
        tracing::info!(order_id = %order_id, status = %status, "Order status updated");

        Ok(updated)
    }

    /// All orders in insertion order
    pub async fn list(&self) -> OrderResult<Vec<Order>> {
        Ok(self.orders.load().await?)
    }

    /// Look up a single order
    pub async fn get(&self, order_id: &str) -> OrderResult<Order> {
        self.list()
            .await?
            .into_iter()
            .find(|o| o.id == order_id)
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))
    }

    pub fn backend_type(&self) -> &'static str {
        self.orders.backend_type()
    }
}
