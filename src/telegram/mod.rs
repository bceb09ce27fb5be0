//! Telegram Bot API transport.

mod client;
mod types;

use thiserror::Error;

pub use client::{MessageSender, TelegramClient};
pub use types::{
    ApiResponse, InlineKeyboardButton, InlineKeyboardMarkup, SendMessageRequest, SentMessage,
};

/// Failure of a single outbound send
#[derive(Debug, Clone, Error)]
pub enum SendError {
    /// The API answered with `ok: false`
    #[error("{description}")]
    Api {
        description: String,
        error_code: Option<u16>,
    },

    /// The request never got an answer (connect, TLS, body errors)
    #[error("{0}")]
    Transport(String),

    /// The send did not complete within the configured timeout
    #[error("request timed out after {0} ms")]
    Timeout(u64),
}

impl SendError {
    /// Whether another attempt may succeed (rate limiting, server errors,
    /// transport failures, timeouts)
    pub fn is_retryable(&self) -> bool {
        match self {
            SendError::Api { error_code, .. } => {
                matches!(error_code, Some(429) | Some(500..=599))
            }
            SendError::Transport(_) | SendError::Timeout(_) => true,
        }
    }

    /// Whether the failure happened below the API level
    pub fn is_network(&self) -> bool {
        !matches!(self, SendError::Api { .. })
    }
}
