//! Seller notifications: settings, dispatch, and the delivery log.
//!
//! [`NotificationDispatcher`] renders an order once and fans it out to every
//! dispatch-eligible seller, recording one [`DispatchResult`] and one
//! [`LogEntry`] per attempt. Send failures are captured per seller and never
//! fail the dispatch as a whole.

mod backoff;
mod dispatcher;
mod log;
mod types;

use thiserror::Error;

use crate::storage::StoreError;

pub use backoff::{BackoffConfig, ExponentialBackoff};
pub use dispatcher::{
    order_keyboard, DispatchPolicy, DispatcherStats, DispatcherStatsSnapshot,
    NotificationDispatcher, TEST_CALLBACK_DATA, TEST_NOTIFICATION_TEMPLATE,
};
pub use log::{DeliveryLog, DEFAULT_LOG_CAPACITY};
pub use types::{
    DispatchReport, DispatchResult, LogEntry, LogEntryKind, NotificationSettings, OrderAction,
    Seller, SellerRole, TestDispatchReport, DEFAULT_NOTIFICATION_TEMPLATE,
};

/// Dispatch-level errors. Per-seller send failures are not errors here;
/// they are reported in [`DispatchResult`].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Telegram bot not configured or no sellers added")]
    NotConfigured,

    #[error("Invalid seller index: {0}")]
    InvalidSeller(usize),

    #[error("Seller '{0}' has no chat id")]
    MissingChatId(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}
