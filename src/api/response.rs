//! Success envelopes shared by the JSON endpoints.

use serde::Serialize;

use crate::notification::DispatchResult;

/// `{success, data?, message?}` envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// Envelope carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Response to `sendNotification`
#[derive(Debug, Serialize)]
pub struct SendNotificationResponse {
    pub success: bool,
    pub results: Vec<DispatchResult>,
    pub message: String,
}

/// Response to `testNotification`
#[derive(Debug, Serialize)]
pub struct TestNotificationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
}
