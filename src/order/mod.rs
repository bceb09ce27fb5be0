//! Order lifecycle: creation, status updates and listing.

mod manager;
mod types;

use thiserror::Error;

use crate::storage::StoreError;

pub use manager::OrderManager;
pub use types::{NewOrder, Order, OrderItem, OrderStatus, UpdateStatusRequest};

/// Order-specific error type
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Order already exists: {0}")]
    AlreadyExists(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Result type for order operations
pub type OrderResult<T> = Result<T, OrderError>;
