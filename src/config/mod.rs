mod settings;

pub use settings::{
    DeliveryLogConfig, LoggingConfig, ServerConfig, Settings, StorageConfig, TelegramConfig,
};
