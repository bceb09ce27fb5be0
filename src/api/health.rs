//! Health check and statistics endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::notification::DispatcherStatsSnapshot;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub storage: StorageHealthResponse,
}

#[derive(Debug, Serialize)]
pub struct StorageHealthResponse {
    pub backend: String,
    /// Whether the settings document could be read
    pub readable: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub dispatcher: DispatcherStatsSnapshot,
    pub orders: OrderStats,
    pub sellers: SellerStats,
    pub delivery_log: DeliveryLogStats,
}

#[derive(Debug, Serialize)]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub cancelled: usize,
}

#[derive(Debug, Serialize)]
pub struct SellerStats {
    pub configured: usize,
    pub eligible: usize,
    pub bot_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct DeliveryLogStats {
    pub entries: usize,
    pub capacity: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let readable = match state.dispatcher.settings().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read settings");
            false
        }
    };

    let status = if readable { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        storage: StorageHealthResponse {
            backend: state.orders.backend_type().to_string(),
            readable,
        },
    })
}

pub async fn stats(State(state): State<AppState>) -> crate::error::Result<Json<StatsResponse>> {
    use crate::order::OrderStatus;

    let orders = state.orders.list().await?;
    let count = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();

    let settings = state.dispatcher.settings().await?;
    let entries = state.dispatcher.log().entries().await?;

    Ok(Json(StatsResponse {
        dispatcher: state.dispatcher.stats(),
        orders: OrderStats {
            total: orders.len(),
            pending: count(OrderStatus::Pending),
            completed: count(OrderStatus::Completed),
            cancelled: count(OrderStatus::Cancelled),
        },
        sellers: SellerStats {
            configured: settings.sellers.len(),
            eligible: settings.eligible_sellers().count(),
            bot_configured: !settings.bot_token.is_empty(),
        },
        delivery_log: DeliveryLogStats {
            entries: entries.len(),
            capacity: state.dispatcher.log().capacity(),
        },
    }))
}
