// Shared components
pub mod config;
pub mod error;
pub mod metrics;
pub mod storage;
pub mod utils;

// Domain layer (business logic)
pub mod notification;
pub mod order;
pub mod telegram;
pub mod template;

// Application layer
pub mod api;
pub mod server;

// Supporting modules
pub mod telemetry;
