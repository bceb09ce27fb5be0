//! Prometheus metrics for the order notification service.
//!
//! - Dispatch metrics (dispatches by outcome, sends by result, send latency)
//! - Order metrics (orders created, status updates by status)
//! - Delivery log metrics (entries retained, write failures)
//! - Settings gauges refreshed on every scrape

mod helpers;

pub use helpers::{encode_metrics, DeliveryLogMetrics, DispatchMetrics, OrderMetrics, SettingsMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "order_notify";

lazy_static! {
    // ============================================================================
    // Dispatch Metrics
    // ============================================================================

    /// Order dispatches by outcome (success, failed, not_configured)
    pub static ref DISPATCHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_dispatches_total", METRIC_PREFIX),
        "Total order dispatches by outcome",
        &["outcome"]
    ).unwrap();

    /// Individual seller sends by result (delivered, api_error, network_error)
    pub static ref SENDS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_sends_total", METRIC_PREFIX),
        "Total messages sent to sellers by result",
        &["result"]
    ).unwrap();

    /// Time spent on one seller send, retries included
    pub static ref SEND_LATENCY: Histogram = register_histogram!(
        format!("{}_send_latency_seconds", METRIC_PREFIX),
        "Seller send latency in seconds",
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    // ============================================================================
    // Order Metrics
    // ============================================================================

    /// Orders created
    pub static ref ORDERS_CREATED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_orders_created_total", METRIC_PREFIX),
        "Total orders created"
    ).unwrap();

    /// Status updates by new status
    pub static ref ORDER_STATUS_UPDATES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_order_status_updates_total", METRIC_PREFIX),
        "Total order status updates by new status",
        &["status"]
    ).unwrap();

    // ============================================================================
    // Delivery Log Metrics
    // ============================================================================

    /// Entries currently retained in the delivery log
    pub static ref DELIVERY_LOG_ENTRIES: IntGauge = register_int_gauge!(
        format!("{}_delivery_log_entries", METRIC_PREFIX),
        "Entries currently retained in the delivery log"
    ).unwrap();

    /// Failed delivery log writes (swallowed)
    pub static ref DELIVERY_LOG_WRITE_FAILURES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_delivery_log_write_failures_total", METRIC_PREFIX),
        "Total delivery log writes that failed"
    ).unwrap();

    // ============================================================================
    // Settings Metrics
    // ============================================================================

    /// Sellers present in the notification settings
    pub static ref SELLERS_CONFIGURED: IntGauge = register_int_gauge!(
        format!("{}_sellers_configured", METRIC_PREFIX),
        "Number of sellers in the notification settings"
    ).unwrap();

    /// Sellers that currently receive dispatches
    pub static ref SELLERS_ELIGIBLE: IntGauge = register_int_gauge!(
        format!("{}_sellers_eligible", METRIC_PREFIX),
        "Number of sellers with a chat id and notifications enabled"
    ).unwrap();
}
