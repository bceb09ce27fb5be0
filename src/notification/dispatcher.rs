use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Map;

use crate::config::TelegramConfig;
use crate::metrics::DispatchMetrics;
use crate::order::{Order, OrderItem, OrderStatus};
use crate::storage::{SettingsStore, StoreHandle};
use crate::telegram::{InlineKeyboardButton, InlineKeyboardMarkup, MessageSender, SendError};
use crate::template::{RenderOptions, TemplateRenderer};
use crate::utils::human_time;

use super::backoff::{BackoffConfig, ExponentialBackoff};
use super::log::DeliveryLog;
use super::{
    DispatchError, DispatchReport, DispatchResult, LogEntryKind, NotificationSettings, OrderAction,
    Seller, SellerRole, TestDispatchReport,
};

/// Message sent by a test dispatch. Uses the same tokens as order templates.
pub const TEST_NOTIFICATION_TEMPLATE: &str = "🧪 <b>TEST NOTIFICATION</b>

This is a test message to check that the bot works

🛒 <b>Test order #{order_id}</b>

👤 <b>Customer:</b> {nickname}

📦 <b>Items:</b>
{order_items}

💰 <b>Total:</b> {total_price} {currency}

🕐 <b>Ordered at:</b> {order_time}
📋 <b>Status:</b> 🧪 Test order";

/// Callback payload of the single test button
pub const TEST_CALLBACK_DATA: &str = "test_completed";

/// How sends are executed within one dispatch
#[derive(Debug, Clone)]
pub struct DispatchPolicy {
    /// Sends in flight at once (1 = strictly sequential)
    pub max_concurrent_sends: usize,
    /// Upper bound for a single send attempt in milliseconds
    pub send_timeout_ms: u64,
    /// Additional attempts for retryable failures
    pub max_retries: u32,
    pub backoff: BackoffConfig,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            max_concurrent_sends: 1,
            send_timeout_ms: 10_000,
            max_retries: 0,
            backoff: BackoffConfig::default(),
        }
    }
}

impl From<&TelegramConfig> for DispatchPolicy {
    fn from(config: &TelegramConfig) -> Self {
        Self {
            max_concurrent_sends: config.max_concurrent_sends.max(1),
            send_timeout_ms: config.send_timeout_ms,
            max_retries: config.max_retries,
            backoff: BackoffConfig {
                initial_delay_ms: config.retry_initial_delay_ms,
                max_delay_ms: config.retry_max_delay_ms,
                ..BackoffConfig::default()
            },
        }
    }
}

/// Statistics for the notification dispatcher
#[derive(Debug, Default)]
pub struct DispatcherStats {
    /// Order dispatches that passed the configuration check
    pub dispatches: AtomicU64,
    /// Test dispatches attempted
    pub test_dispatches: AtomicU64,
    /// Sends accepted by the messaging API
    pub sends_delivered: AtomicU64,
    /// Sends that failed after all attempts
    pub sends_failed: AtomicU64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            dispatches: self.dispatches.load(Ordering::Relaxed),
            test_dispatches: self.test_dispatches.load(Ordering::Relaxed),
            sends_delivered: self.sends_delivered.load(Ordering::Relaxed),
            sends_failed: self.sends_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatcher statistics
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherStatsSnapshot {
    pub dispatches: u64,
    pub test_dispatches: u64,
    pub sends_delivered: u64,
    pub sends_failed: u64,
}

/// Fans order notifications out to sellers
pub struct NotificationDispatcher {
    sender: Arc<dyn MessageSender>,
    settings: StoreHandle<NotificationSettings>,
    log: Arc<DeliveryLog>,
    renderer: TemplateRenderer,
    policy: DispatchPolicy,
    stats: DispatcherStats,
}

impl NotificationDispatcher {
    pub fn new(
        sender: Arc<dyn MessageSender>,
        settings: Arc<SettingsStore>,
        log: Arc<DeliveryLog>,
    ) -> Self {
        Self {
            sender,
            settings: StoreHandle::new(settings),
            log,
            renderer: TemplateRenderer::default(),
            policy: DispatchPolicy::default(),
            stats: DispatcherStats::default(),
        }
    }

    /// Build a dispatcher with rendering and send policy taken from config
    pub fn from_config(
        config: &TelegramConfig,
        sender: Arc<dyn MessageSender>,
        settings: Arc<SettingsStore>,
        log: Arc<DeliveryLog>,
    ) -> Self {
        Self::new(sender, settings, log)
            .with_renderer(TemplateRenderer::new(RenderOptions::from(config)))
            .with_policy(DispatchPolicy::from(config))
    }

    pub fn with_renderer(mut self, renderer: TemplateRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get dispatcher statistics
    pub fn stats(&self) -> DispatcherStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn log(&self) -> &Arc<DeliveryLog> {
        &self.log
    }

    /// Current notification settings (defaults materialised on first access)
    pub async fn settings(&self) -> Result<NotificationSettings, DispatchError> {
        Ok(self.settings.load().await?)
    }

    /// Replace the notification settings wholesale
    #[tracing::instrument(name = "dispatcher.save_settings", skip(self, settings), fields(sellers = settings.sellers.len()))]
    pub async fn save_settings(&self, settings: NotificationSettings) -> Result<(), DispatchError> {
        self.settings.replace(settings).await?;
        self.log
            .append("⚙️ Notification settings updated", LogEntryKind::Info)
            .await;
        tracing::info!("Notification settings saved");
        Ok(())
    }

    /// Load the current settings and dispatch `order` with them
    pub async fn notify(&self, order: &Order) -> Result<DispatchReport, DispatchError> {
        let settings = self.settings.load().await?;
        self.dispatch(order, &settings).await
    }

    /// Render `order` once and send it to every eligible seller.
    ///
    /// Results keep seller order whatever the concurrency cap. The report
    /// succeeds when at least one send succeeded.
    #[tracing::instrument(
        name = "dispatcher.dispatch",
        skip(self, order, settings),
        fields(order_id = %order.id, sellers = settings.sellers.len())
    )]
    pub async fn dispatch(
        &self,
        order: &Order,
        settings: &NotificationSettings,
    ) -> Result<DispatchReport, DispatchError> {
        if !settings.is_configured() {
            DispatchMetrics::record_dispatch("not_configured");
            return Err(DispatchError::NotConfigured);
        }

        let message = self.renderer.render(&settings.notification_template, order);
        let keyboard = order_keyboard(&order.id);

        // Sends are built up front; `buffered` polls them in seller order
        let sends: Vec<BoxFuture<'_, DispatchResult>> = settings
            .eligible_sellers()
            .map(|seller| {
                let keyboard = (seller.role == SellerRole::Admin).then_some(&keyboard);
                self.deliver(&settings.bot_token, seller, &message, keyboard)
                    .boxed()
            })
            .collect();

        let results: Vec<DispatchResult> = stream::iter(sends)
            .buffered(self.policy.max_concurrent_sends.max(1))
            .collect()
            .await;

        let report = DispatchReport::from_results(results);

        self.stats.dispatches.fetch_add(1, Ordering::Relaxed);
        DispatchMetrics::record_dispatch(if report.success { "success" } else { "failed" });

        tracing::info!(
            order_id = %order.id,
            delivered = report.successful_sends(),
            attempted = report.results.len(),
            "{}",
            report.summary
        );

        Ok(report)
    }

    /// Send the fixed test message to `sellers[seller_index]` only.
    ///
    /// Ignores the seller's notification switch and never touches orders.
    #[tracing::instrument(name = "dispatcher.test_dispatch", skip(self))]
    pub async fn test_dispatch(&self, seller_index: usize) -> Result<TestDispatchReport, DispatchError> {
        let settings = self.settings.load().await?;

        if settings.bot_token.is_empty() {
            return Err(DispatchError::NotConfigured);
        }

        let seller = settings
            .sellers
            .get(seller_index)
            .ok_or(DispatchError::InvalidSeller(seller_index))?;

        if seller.chat_id.is_empty() {
            return Err(DispatchError::MissingChatId(seller.name.clone()));
        }

        let order = test_order();
        let message = self.renderer.render(TEST_NOTIFICATION_TEMPLATE, &order);
        let keyboard = (seller.role == SellerRole::Admin).then(test_keyboard);

        self.stats.test_dispatches.fetch_add(1, Ordering::Relaxed);
        let result = self
            .deliver(&settings.bot_token, seller, &message, keyboard.as_ref())
            .await;

        Ok(TestDispatchReport::from_result(result))
    }

    /// One send to one seller, recorded in the delivery log
    async fn deliver(
        &self,
        bot_token: &str,
        seller: &Seller,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> DispatchResult {
        let started = Instant::now();
        let outcome = self
            .send_with_policy(bot_token, &seller.chat_id, text, keyboard)
            .await;
        DispatchMetrics::observe_send_latency(started.elapsed().as_secs_f64());

        match outcome {
            Ok(message_id) => {
                self.stats.sends_delivered.fetch_add(1, Ordering::Relaxed);
                DispatchMetrics::record_send("delivered");

                tracing::debug!(
                    seller = %seller.name,
                    chat_id = %seller.chat_id,
                    message_id = message_id,
                    "Notification delivered"
                );

                self.log
                    .append(
                        format!("✅ Notification sent to chat {}", seller.chat_id),
                        LogEntryKind::Success,
                    )
                    .await;

                DispatchResult::delivered(seller)
            }
            Err(error) => {
                self.stats.sends_failed.fetch_add(1, Ordering::Relaxed);
                DispatchMetrics::record_send(if error.is_network() { "network_error" } else { "api_error" });

                tracing::warn!(
                    seller = %seller.name,
                    chat_id = %seller.chat_id,
                    error = %error,
                    "Notification send failed"
                );

                let entry = if error.is_network() {
                    format!("❌ Network error sending to chat {}: {}", seller.chat_id, error)
                } else {
                    format!("❌ Failed to send to chat {}: {}", seller.chat_id, error)
                };
                self.log.append(entry, LogEntryKind::Error).await;

                DispatchResult::failed(seller, error.to_string())
            }
        }
    }

    /// Send with a timeout per attempt, retrying retryable failures
    async fn send_with_policy(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<i64, SendError> {
        let mut backoff = ExponentialBackoff::new(self.policy.backoff.clone());

        loop {
            let error = match self.send_once(bot_token, chat_id, text, keyboard).await {
                Ok(message_id) => return Ok(message_id),
                Err(error) => error,
            };

            if !error.is_retryable() || backoff.attempt() >= self.policy.max_retries {
                return Err(error);
            }

            let delay = backoff.next_delay();
            tracing::debug!(
                chat_id = %chat_id,
                attempt = backoff.attempt(),
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying send"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn send_once(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<i64, SendError> {
        let timeout = Duration::from_millis(self.policy.send_timeout_ms);
        match tokio::time::timeout(
            timeout,
            self.sender.send_message(bot_token, chat_id, text, keyboard),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SendError::Timeout(self.policy.send_timeout_ms)),
        }
    }
}

/// Status buttons attached for admin sellers
pub fn order_keyboard(order_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::single_row(vec![
        InlineKeyboardButton::callback("✅ Completed", OrderAction::Completed.callback_data(order_id)),
        InlineKeyboardButton::callback("❌ Cancelled", OrderAction::Cancelled.callback_data(order_id)),
    ])
}

fn test_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::single_row(vec![InlineKeyboardButton::callback(
        "✅ Test passed",
        TEST_CALLBACK_DATA,
    )])
}

/// Example order used by test dispatches
fn test_order() -> Order {
    let now = Utc::now();
    Order {
        id: format!("TEST-{:06}", now.timestamp_millis().rem_euclid(1_000_000)),
        items: vec![OrderItem {
            name: "Test item".to_string(),
            quantity: 1,
            total: 100.5,
        }],
        nickname: "Test customer".to_string(),
        total_price: 100.5,
        time: human_time(now),
        status: OrderStatus::Pending,
        created_at: now,
        updated_at: None,
        extra: Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::notification::{LogEntry, DEFAULT_NOTIFICATION_TEMPLATE};
    use crate::storage::MemoryStore;

    #[derive(Debug, Clone)]
    struct SentCall {
        chat_id: String,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    }

    /// Scripted sender: per-chat failures and delays
    #[derive(Default)]
    struct FakeSender {
        failures: HashMap<String, SendError>,
        delays: HashMap<String, Duration>,
        /// Failures returned before the chat starts succeeding
        flaky: Mutex<HashMap<String, u32>>,
        calls: Mutex<Vec<SentCall>>,
    }

    impl FakeSender {
        fn failing(mut self, chat_id: &str, error: SendError) -> Self {
            self.failures.insert(chat_id.to_string(), error);
            self
        }

        fn delayed(mut self, chat_id: &str, delay: Duration) -> Self {
            self.delays.insert(chat_id.to_string(), delay);
            self
        }

        fn flaky(self, chat_id: &str, failures: u32) -> Self {
            self.flaky.lock().unwrap().insert(chat_id.to_string(), failures);
            self
        }

        fn calls(&self) -> Vec<SentCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageSender for FakeSender {
        async fn send_message(
            &self,
            _bot_token: &str,
            chat_id: &str,
            text: &str,
            keyboard: Option<&InlineKeyboardMarkup>,
        ) -> Result<i64, SendError> {
            self.calls.lock().unwrap().push(SentCall {
                chat_id: chat_id.to_string(),
                text: text.to_string(),
                keyboard: keyboard.cloned(),
            });

            if let Some(delay) = self.delays.get(chat_id) {
                tokio::time::sleep(*delay).await;
            }

            {
                let mut flaky = self.flaky.lock().unwrap();
                if let Some(remaining) = flaky.get_mut(chat_id) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        return Err(SendError::Transport("connection reset".to_string()));
                    }
                }
            }

            match self.failures.get(chat_id) {
                Some(error) => Err(error.clone()),
                None => Ok(1),
            }
        }
    }

    fn seller(name: &str, chat_id: &str, role: SellerRole, enabled: bool) -> Seller {
        Seller {
            name: name.to_string(),
            chat_id: chat_id.to_string(),
            role,
            notifications_enabled: enabled,
        }
    }

    fn settings(sellers: Vec<Seller>) -> NotificationSettings {
        NotificationSettings {
            bot_token: "123:ABC".to_string(),
            sellers,
            notification_template: "Order #{order_id} from {nickname}".to_string(),
        }
    }

    fn order() -> Order {
        Order {
            id: "42".to_string(),
            items: vec![OrderItem {
                name: "Sword".to_string(),
                quantity: 2,
                total: 20.0,
            }],
            nickname: "Ann".to_string(),
            total_price: 20.0,
            time: "12:00".to_string(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
            extra: Map::new(),
        }
    }

    fn chat_not_found() -> SendError {
        SendError::Api {
            description: "Bad Request: chat not found".to_string(),
            error_code: Some(400),
        }
    }

    struct Harness {
        dispatcher: NotificationDispatcher,
        sender: Arc<FakeSender>,
        log: Arc<DeliveryLog>,
    }

    fn harness(sender: FakeSender, stored: NotificationSettings) -> Harness {
        let sender = Arc::new(sender);
        let log = Arc::new(DeliveryLog::new(
            Arc::new(MemoryStore::<Vec<LogEntry>>::new()),
            100,
        ));
        let dispatcher = NotificationDispatcher::new(
            sender.clone(),
            Arc::new(MemoryStore::with_value(stored)),
            log.clone(),
        );
        Harness {
            dispatcher,
            sender,
            log,
        }
    }

    #[tokio::test]
    async fn test_dispatch_skips_ineligible_sellers() {
        let stored = settings(vec![
            seller("A", "1", SellerRole::Viewer, true),
            seller("B", "", SellerRole::Viewer, true),
            seller("C", "3", SellerRole::Viewer, false),
            seller("D", "4", SellerRole::Viewer, true),
        ]);
        let h = harness(FakeSender::default(), stored.clone());

        let report = h.dispatcher.dispatch(&order(), &stored).await.unwrap();

        assert!(report.success);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].seller, "A");
        assert_eq!(report.results[1].seller, "D");
        assert_eq!(report.summary, "Notifications sent to 2/2 sellers");
        assert_eq!(h.log.entries().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_any_succeeded() {
        let stored = settings(vec![
            seller("A", "1", SellerRole::Viewer, true),
            seller("B", "2", SellerRole::Viewer, true),
        ]);
        let h = harness(FakeSender::default().failing("1", chat_not_found()), stored.clone());

        let report = h.dispatcher.dispatch(&order(), &stored).await.unwrap();

        assert!(report.success);
        assert!(!report.results[0].success);
        assert_eq!(
            report.results[0].error.as_deref(),
            Some("Bad Request: chat not found")
        );
        assert!(report.results[1].success);
        assert_eq!(report.summary, "Notifications sent to 1/2 sellers");

        let entries = h.log.entries().await.unwrap();
        assert_eq!(
            entries[0].message,
            "❌ Failed to send to chat 1: Bad Request: chat not found"
        );
        assert_eq!(entries[0].kind, LogEntryKind::Error);
        assert_eq!(entries[1].message, "✅ Notification sent to chat 2");
        assert_eq!(entries[1].kind, LogEntryKind::Success);
    }

    #[tokio::test]
    async fn test_dispatch_all_failed() {
        let stored = settings(vec![seller("A", "1", SellerRole::Viewer, true)]);
        let h = harness(
            FakeSender::default().failing("1", SendError::Transport("connection refused".into())),
            stored.clone(),
        );

        let report = h.dispatcher.dispatch(&order(), &stored).await.unwrap();

        assert!(!report.success);
        assert_eq!(report.summary, "Notifications sent to 0/1 sellers");
        let entries = h.log.entries().await.unwrap();
        assert_eq!(
            entries[0].message,
            "❌ Network error sending to chat 1: connection refused"
        );
    }

    #[tokio::test]
    async fn test_dispatch_requires_configuration() {
        let no_token = NotificationSettings {
            bot_token: String::new(),
            ..settings(vec![seller("A", "1", SellerRole::Viewer, true)])
        };
        let no_sellers = settings(Vec::new());
        let h = harness(FakeSender::default(), no_token.clone());

        let err = h.dispatcher.dispatch(&order(), &no_token).await.unwrap_err();
        assert!(matches!(err, DispatchError::NotConfigured));
        let err = h.dispatcher.dispatch(&order(), &no_sellers).await.unwrap_err();
        assert!(matches!(err, DispatchError::NotConfigured));

        assert!(h.sender.calls().is_empty());
        assert!(h.log.entries().await.unwrap().is_empty());
        assert_eq!(h.dispatcher.stats().dispatches, 0);
    }

    #[tokio::test]
    async fn test_admin_sellers_get_status_keyboard() {
        let stored = settings(vec![
            seller("Admin", "1", SellerRole::Admin, true),
            seller("Viewer", "2", SellerRole::Viewer, true),
        ]);
        let h = harness(FakeSender::default(), stored.clone());

        h.dispatcher.dispatch(&order(), &stored).await.unwrap();

        let calls = h.sender.calls();
        let keyboard = calls[0].keyboard.as_ref().unwrap();
        let buttons = &keyboard.inline_keyboard[0];
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0].text, "✅ Completed");
        assert_eq!(buttons[0].callback_data, "completed_42");
        assert_eq!(buttons[1].text, "❌ Cancelled");
        assert_eq!(buttons[1].callback_data, "cancelled_42");
        assert!(calls[1].keyboard.is_none());
        assert_eq!(calls[0].text, "Order #42 from Ann");
        assert_eq!(calls[0].text, calls[1].text);
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure_and_later_sellers_still_run() {
        let stored = settings(vec![
            seller("Slow", "1", SellerRole::Viewer, true),
            seller("Fast", "2", SellerRole::Viewer, true),
        ]);
        let mut h = harness(
            FakeSender::default().delayed("1", Duration::from_millis(500)),
            stored.clone(),
        );
        h.dispatcher = h.dispatcher.with_policy(DispatchPolicy {
            send_timeout_ms: 50,
            ..DispatchPolicy::default()
        });

        let report = h.dispatcher.dispatch(&order(), &stored).await.unwrap();

        assert!(report.success);
        assert_eq!(
            report.results[0].error.as_deref(),
            Some("request timed out after 50 ms")
        );
        assert!(report.results[1].success);
        assert_eq!(h.sender.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_sends_keep_seller_order() {
        let stored = settings(vec![
            seller("A", "1", SellerRole::Viewer, true),
            seller("B", "2", SellerRole::Viewer, true),
            seller("C", "3", SellerRole::Viewer, true),
        ]);
        let mut h = harness(
            FakeSender::default()
                .delayed("1", Duration::from_millis(150))
                .delayed("2", Duration::from_millis(75)),
            stored.clone(),
        );
        h.dispatcher = h.dispatcher.with_policy(DispatchPolicy {
            max_concurrent_sends: 3,
            ..DispatchPolicy::default()
        });

        let report = h.dispatcher.dispatch(&order(), &stored).await.unwrap();

        let sellers: Vec<_> = report.results.iter().map(|r| r.seller.as_str()).collect();
        assert_eq!(sellers, vec!["A", "B", "C"]);
        assert_eq!(report.successful_sends(), 3);
    }

    #[tokio::test]
    async fn test_retryable_failures_are_retried() {
        let stored = settings(vec![seller("A", "1", SellerRole::Viewer, true)]);
        let mut h = harness(FakeSender::default().flaky("1", 2), stored.clone());
        h.dispatcher = h.dispatcher.with_policy(DispatchPolicy {
            max_retries: 2,
            backoff: BackoffConfig {
                initial_delay_ms: 1,
                max_delay_ms: 2,
                multiplier: 2.0,
                jitter_factor: 0.0,
            },
            ..DispatchPolicy::default()
        });

        let report = h.dispatcher.dispatch(&order(), &stored).await.unwrap();

        assert!(report.success);
        assert_eq!(h.sender.calls().len(), 3);
        // One log entry per seller, not per attempt
        assert_eq!(h.log.entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_api_errors_are_not_retried() {
        let stored = settings(vec![seller("A", "1", SellerRole::Viewer, true)]);
        let mut h = harness(FakeSender::default().failing("1", chat_not_found()), stored.clone());
        h.dispatcher = h.dispatcher.with_policy(DispatchPolicy {
            max_retries: 3,
            ..DispatchPolicy::default()
        });

        let report = h.dispatcher.dispatch(&order(), &stored).await.unwrap();

        assert!(!report.success);
        assert_eq!(h.sender.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_notify_uses_stored_settings() {
        let mut stored = settings(vec![seller("A", "1", SellerRole::Viewer, true)]);
        stored.notification_template = DEFAULT_NOTIFICATION_TEMPLATE.to_string();
        let h = harness(FakeSender::default(), stored);

        let report = h.dispatcher.notify(&order()).await.unwrap();

        assert!(report.success);
        assert!(h.sender.calls()[0].text.contains("NEW ORDER #42"));
        assert_eq!(h.dispatcher.stats().dispatches, 1);
        assert_eq!(h.dispatcher.stats().sends_delivered, 1);
    }

    #[tokio::test]
    async fn test_test_dispatch_targets_one_seller() {
        let stored = settings(vec![
            seller("Muted", "1", SellerRole::Admin, false),
            seller("Other", "2", SellerRole::Viewer, true),
        ]);
        let h = harness(FakeSender::default(), stored);

        let report = h.dispatcher.test_dispatch(0).await.unwrap();

        assert!(report.success);
        assert!(report.error.is_none());
        assert_eq!(report.summary, "Test notification sent to Muted");

        let calls = h.sender.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].chat_id, "1");
        assert!(calls[0].text.contains("TEST NOTIFICATION"));
        assert!(calls[0].text.contains("#TEST-"));
        assert!(calls[0].text.contains("• Test item × 1 = 100.5 coins"));
        let keyboard = calls[0].keyboard.as_ref().unwrap();
        assert_eq!(keyboard.inline_keyboard[0].len(), 1);
        assert_eq!(keyboard.inline_keyboard[0][0].callback_data, "test_completed");
        assert_eq!(h.dispatcher.stats().test_dispatches, 1);
        assert_eq!(h.log.entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_test_dispatch_reports_failure() {
        let stored = settings(vec![seller("A", "1", SellerRole::Viewer, true)]);
        let h = harness(FakeSender::default().failing("1", chat_not_found()), stored);

        let report = h.dispatcher.test_dispatch(0).await.unwrap();

        assert!(!report.success);
        assert_eq!(report.summary, "Failed to send test: Bad Request: chat not found");
        assert!(h.sender.calls()[0].keyboard.is_none());
    }

    #[tokio::test]
    async fn test_test_dispatch_uses_configured_currency() {
        let stored = settings(vec![seller("A", "1", SellerRole::Viewer, true)]);
        let Harness { dispatcher, sender, .. } = harness(FakeSender::default(), stored);
        let dispatcher = dispatcher.with_renderer(TemplateRenderer::new(RenderOptions {
            currency_unit: "credits".to_string(),
            ..RenderOptions::default()
        }));

        dispatcher.test_dispatch(0).await.unwrap();

        let text = &sender.calls()[0].text;
        assert!(text.contains("• Test item × 1 = 100.5 credits"));
        assert!(text.contains("<b>Total:</b> 100.5 credits"));
        assert!(!text.contains("coins"));
    }

    #[tokio::test]
    async fn test_test_dispatch_validates_input() {
        let stored = settings(vec![seller("NoChat", "", SellerRole::Viewer, true)]);
        let h = harness(FakeSender::default(), stored);

        assert!(matches!(
            h.dispatcher.test_dispatch(5).await.unwrap_err(),
            DispatchError::InvalidSeller(5)
        ));
        assert!(matches!(
            h.dispatcher.test_dispatch(0).await.unwrap_err(),
            DispatchError::MissingChatId(_)
        ));

        let h = harness(FakeSender::default(), NotificationSettings::default());
        assert!(matches!(
            h.dispatcher.test_dispatch(0).await.unwrap_err(),
            DispatchError::NotConfigured
        ));
        assert!(h.sender.calls().is_empty());
    }

    #[tokio::test]
    async fn test_save_settings_replaces_and_logs() {
        let h = harness(FakeSender::default(), NotificationSettings::default());
        let updated = settings(vec![seller("A", "1", SellerRole::Admin, true)]);

        h.dispatcher.save_settings(updated.clone()).await.unwrap();

        assert_eq!(h.dispatcher.settings().await.unwrap(), updated);
        let entries = h.log.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, LogEntryKind::Info);
    }

    #[test]
    fn test_test_order_id_format() {
        let order = test_order();
        let suffix = order.id.strip_prefix("TEST-").unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }
}
