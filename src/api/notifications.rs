//! Notification settings, dispatch, and delivery log endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::error::Result;
use crate::notification::{LogEntry, NotificationSettings};
use crate::order::Order;
use crate::server::AppState;

use super::response::{ApiResponse, SendNotificationResponse, TestNotificationResponse};

/// Body of `POST /api/telegram`, tagged by `action`
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum NotificationAction {
    /// Replace the notification settings
    SaveSettings { settings: NotificationSettings },
    /// Dispatch an order to all eligible sellers
    SendNotification { order: Order },
    /// Send the test message to one seller
    #[serde(rename_all = "camelCase")]
    TestNotification { seller_index: usize },
}

/// GET /api/telegram - Current notification settings
#[tracing::instrument(name = "http.get_notification_settings", skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<NotificationSettings>>> {
    let settings = state.dispatcher.settings().await?;
    Ok(Json(ApiResponse::data(settings)))
}

/// POST /api/telegram - Run a notification action
#[tracing::instrument(name = "http.notification_action", skip(state, payload))]
pub async fn notification_action(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NotificationAction>, JsonRejection>,
) -> Result<Response> {
    let Json(action) = payload?;

    let response = match action {
        NotificationAction::SaveSettings { settings } => {
            state.dispatcher.save_settings(settings).await?;
            Json(ApiResponse::message("Settings saved successfully")).into_response()
        }
        NotificationAction::SendNotification { order } => {
            let report = state.dispatcher.notify(&order).await?;
            Json(SendNotificationResponse {
                success: report.success,
                results: report.results,
                message: report.summary,
            })
            .into_response()
        }
        NotificationAction::TestNotification { seller_index } => {
            let report = state.dispatcher.test_dispatch(seller_index).await?;
            Json(TestNotificationResponse {
                success: report.success,
                error: report.error,
                message: report.summary,
            })
            .into_response()
        }
    };

    Ok(response)
}

/// GET /api/notifications/log - Delivery log, oldest first
#[tracing::instrument(name = "http.delivery_log", skip(state))]
pub async fn delivery_log(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<LogEntry>>>> {
    let entries = state.dispatcher.log().entries().await?;
    Ok(Json(ApiResponse::data(entries)))
}
