//! Prometheus metrics endpoint.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::metrics::{self, DeliveryLogMetrics, SettingsMetrics};
use crate::server::AppState;

/// GET /metrics - Prometheus metrics endpoint
pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    update_metrics_from_state(&state).await;

    match metrics::encode_metrics() {
        Ok(output) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode Prometheus metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(axum::http::header::CONTENT_TYPE, "text/plain")],
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}

/// Refresh gauges that mirror stored state
async fn update_metrics_from_state(state: &AppState) {
    match state.dispatcher.settings().await {
        Ok(settings) => {
            SettingsMetrics::set_sellers(settings.sellers.len(), settings.eligible_sellers().count())
        }
        Err(e) => tracing::warn!(error = %e, "Failed to read settings for metrics"),
    }

    match state.dispatcher.log().entries().await {
        Ok(entries) => DeliveryLogMetrics::set_entries(entries.len()),
        Err(e) => tracing::warn!(error = %e, "Failed to read delivery log for metrics"),
    }
}
