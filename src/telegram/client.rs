use async_trait::async_trait;
use reqwest::Client;

use crate::config::TelegramConfig;

use super::types::{ApiResponse, InlineKeyboardMarkup, SendMessageRequest, SentMessage};
use super::SendError;

/// Outbound message transport.
///
/// Implemented by [`TelegramClient`] for the real Bot API; tests substitute
/// their own implementations.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send `text` (HTML) to `chat_id`, returning the provider's message id.
    async fn send_message(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<i64, SendError>;
}

/// Bot API client
pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("order-notification-service/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn send_message_url(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, bot_token)
    }
}

#[async_trait]
impl MessageSender for TelegramClient {
    #[tracing::instrument(name = "telegram.send_message", skip(self, bot_token, text, keyboard))]
    async fn send_message(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<i64, SendError> {
        let request = SendMessageRequest::html(chat_id, text, keyboard);

        let response = self
            .client
            .post(self.send_message_url(bot_token))
            .json(&request)
            .send()
            .await
            // The URL embeds the bot token, keep it out of error text
            .map_err(|e| SendError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body: ApiResponse<SentMessage> = match response.json().await {
            Ok(body) => body,
            Err(_) => {
                return Err(SendError::Api {
                    description: format!("Unexpected response (HTTP {})", status.as_u16()),
                    error_code: Some(status.as_u16()),
                })
            }
        };

        if !body.ok {
            return Err(SendError::Api {
                description: body
                    .description
                    .unwrap_or_else(|| format!("Request failed (HTTP {})", status.as_u16())),
                error_code: body.error_code.or(Some(status.as_u16())),
            });
        }

        body.result
            .map(|message| message.message_id)
            .ok_or_else(|| SendError::Api {
                description: "Response is missing the sent message".to_string(),
                error_code: None,
            })
    }
}
