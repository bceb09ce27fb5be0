use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::human_time;

/// Template used until an operator saves their own
pub const DEFAULT_NOTIFICATION_TEMPLATE: &str = "🛒 <b>NEW ORDER #{order_id}</b>

👤 <b>Customer:</b> {nickname}

📦 <b>Items:</b>
{order_items}

💰 <b>Total:</b> {total_price} {currency}

🕐 <b>Ordered at:</b> {order_time}
📋 <b>Status:</b> ⏳ Awaiting processing

━━━━━━━━━━━━━━━━━━━━
<i>Use the buttons below to change the status</i>";

/// Seller capability level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SellerRole {
    /// Receives order actions as inline buttons
    Admin,
    /// Receives the message only (default)
    #[default]
    Viewer,
}

/// A human recipient of order notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub name: String,
    /// Telegram chat identifier
    #[serde(default)]
    pub chat_id: String,
    #[serde(default)]
    pub role: SellerRole,
    #[serde(default)]
    pub notifications_enabled: bool,
}

impl Seller {
    /// A seller receives dispatches only with a chat id and notifications on
    pub fn is_dispatch_eligible(&self) -> bool {
        !self.chat_id.is_empty() && self.notifications_enabled
    }
}

/// Process-wide notification configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub sellers: Vec<Seller>,
    #[serde(default = "default_template")]
    pub notification_template: String,
}

fn default_template() -> String {
    DEFAULT_NOTIFICATION_TEMPLATE.to_string()
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            sellers: Vec::new(),
            notification_template: default_template(),
        }
    }
}

impl NotificationSettings {
    /// A bot token and at least one seller are required to dispatch
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.sellers.is_empty()
    }

    /// Sellers that will receive a dispatch, in stored order
    pub fn eligible_sellers(&self) -> impl Iterator<Item = &Seller> {
        self.sellers.iter().filter(|s| s.is_dispatch_eligible())
    }
}

/// Action a seller can take on an order from the message keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Completed,
    Cancelled,
}

impl OrderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::Completed => "completed",
            OrderAction::Cancelled => "cancelled",
        }
    }

    /// Callback payload `{action}_{order_id}`
    pub fn callback_data(&self, order_id: &str) -> String {
        format!("{}_{}", self.as_str(), order_id)
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one send attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    /// Seller name
    pub seller: String,
    pub chat_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchResult {
    pub fn delivered(seller: &Seller) -> Self {
        Self {
            seller: seller.name.clone(),
            chat_id: seller.chat_id.clone(),
            success: true,
            error: None,
        }
    }

    pub fn failed(seller: &Seller, error: impl Into<String>) -> Self {
        Self {
            seller: seller.name.clone(),
            chat_id: seller.chat_id.clone(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregate outcome of a dispatch
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    /// True when at least one send succeeded
    pub success: bool,
    /// One entry per eligible seller, in seller order
    pub results: Vec<DispatchResult>,
    pub summary: String,
}

impl DispatchReport {
    pub fn from_results(results: Vec<DispatchResult>) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            success: successful > 0,
            summary: format!(
                "Notifications sent to {}/{} sellers",
                successful,
                results.len()
            ),
            results,
        }
    }

    pub fn successful_sends(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }
}

/// Outcome of a test dispatch to a single seller
#[derive(Debug, Clone, Serialize)]
pub struct TestDispatchReport {
    pub success: bool,
    pub error: Option<String>,
    pub summary: String,
}

impl TestDispatchReport {
    pub fn from_result(result: DispatchResult) -> Self {
        let summary = match &result.error {
            None => format!("Test notification sent to {}", result.seller),
            Some(error) => format!("Failed to send test: {}", error),
        };
        Self {
            success: result.success,
            error: result.error,
            summary,
        }
    }
}

/// Delivery log entry type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogEntryKind {
    #[default]
    Info,
    Success,
    Error,
}

/// One delivery log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: LogEntryKind,
    /// Machine-readable timestamp (RFC 3339)
    pub timestamp: DateTime<Utc>,
    /// Local time formatted for operators
    #[serde(default)]
    pub human_time: String,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, kind: LogEntryKind) -> Self {
        let now = Utc::now();
        Self {
            message: message.into(),
            kind,
            timestamp: now,
            human_time: human_time(now),
        }
    }
}
