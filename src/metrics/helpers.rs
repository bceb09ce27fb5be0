//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use crate::order::OrderStatus;

use super::{
    DELIVERY_LOG_ENTRIES, DELIVERY_LOG_WRITE_FAILURES_TOTAL, DISPATCHES_TOTAL,
    ORDERS_CREATED_TOTAL, ORDER_STATUS_UPDATES_TOTAL, SELLERS_CONFIGURED, SELLERS_ELIGIBLE,
    SENDS_TOTAL, SEND_LATENCY,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording dispatch metrics
pub struct DispatchMetrics;

impl DispatchMetrics {
    /// Record a dispatch outcome
    pub fn record_dispatch(outcome: &str) {
        DISPATCHES_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record the result of one seller send
    pub fn record_send(result: &str) {
        SENDS_TOTAL.with_label_values(&[result]).inc();
    }

    pub fn observe_send_latency(seconds: f64) {
        SEND_LATENCY.observe(seconds);
    }
}

/// Helper struct for recording order metrics
pub struct OrderMetrics;

impl OrderMetrics {
    pub fn record_created() {
        ORDERS_CREATED_TOTAL.inc();
    }

    pub fn record_status_update(status: OrderStatus) {
        ORDER_STATUS_UPDATES_TOTAL
            .with_label_values(&[status.as_str()])
            .inc();
    }
}

/// Helper struct for delivery log metrics
pub struct DeliveryLogMetrics;

impl DeliveryLogMetrics {
    pub fn record_write_failure() {
        DELIVERY_LOG_WRITE_FAILURES_TOTAL.inc();
    }

    pub fn set_entries(count: usize) {
        DELIVERY_LOG_ENTRIES.set(count as i64);
    }
}

/// Helper struct for settings gauges
pub struct SettingsMetrics;

impl SettingsMetrics {
    pub fn set_sellers(configured: usize, eligible: usize) {
        SELLERS_CONFIGURED.set(configured as i64);
        SELLERS_ELIGIBLE.set(eligible as i64);
    }
}
