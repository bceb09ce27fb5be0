use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::notification::{DeliveryLog, NotificationDispatcher};
use crate::order::OrderManager;
use crate::storage::{create_stores, Stores};
use crate::telegram::{MessageSender, TelegramClient};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub orders: Arc<OrderManager>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub start_time: Instant,
}

impl AppState {
    /// Build the state from configuration with the real Bot API client
    pub fn new(settings: Settings) -> Result<Self, reqwest::Error> {
        let stores = create_stores(&settings.storage);
        let sender = Arc::new(TelegramClient::new(&settings.telegram)?);
        Ok(Self::with_components(settings, stores, sender))
    }

    /// Build the state from explicit stores and message transport
    pub fn with_components(
        settings: Settings,
        stores: Stores,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        let orders = Arc::new(OrderManager::new(stores.orders));
        let log = Arc::new(DeliveryLog::new(stores.log, settings.delivery_log.capacity));
        let dispatcher = Arc::new(NotificationDispatcher::from_config(
            &settings.telegram,
            sender,
            stores.settings,
            log,
        ));

        Self {
            settings: Arc::new(settings),
            orders,
            dispatcher,
            start_time: Instant::now(),
        }
    }
}
