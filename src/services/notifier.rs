// src/services/notifier.rs

//! Outbound message delivery.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{OutgoingMessage, RetryPolicy, TelegramConfig};
use crate::utils::http::create_telegram_client;
use crate::utils::retry::with_retry;

/// A channel that can deliver text messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message, returning whether it went through.
    ///
    /// Transport failures are logged and reported as `false`, never raised.
    async fn send(&self, chat_id: &str, message: &OutgoingMessage) -> bool;

    /// Short name for logging
    fn name(&self) -> &'static str;
}

#[derive(Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize, Default)]
struct ApiReply {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

/// Delivers messages through the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    retry: RetryPolicy,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig, bot_token: &str) -> Result<Self> {
        Ok(Self::with_client(
            create_telegram_client(config)?,
            &config.api_base,
            bot_token,
            config.retry,
        ))
    }

    pub fn with_client(client: Client, api_base: &str, bot_token: &str, retry: RetryPolicy) -> Self {
        Self {
            client,
            endpoint: format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), bot_token),
            retry,
        }
    }

    async fn send_once(&self, body: &SendMessageBody<'_>) -> Result<()> {
        let response = self.client.post(&self.endpoint).json(body).send().await?;
        let status = response.status();
        let reply: ApiReply = response.json().await.unwrap_or_default();

        if status.is_success() && reply.ok {
            return Ok(());
        }

        // Flood control: the next attempt must wait at least `retry_after`.
        if let Some(secs) = reply.parameters.and_then(|p| p.retry_after) {
            log::info!("Telegram asked to retry after {}s", secs);
            tokio::time::sleep(Duration::from_secs(secs)).await;
        }

        Err(AppError::Api {
            status: status.as_u16(),
            message: reply
                .description
                .unwrap_or_else(|| "request was not accepted".to_string()),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: &str, message: &OutgoingMessage) -> bool {
        let body = SendMessageBody {
            chat_id,
            text: &message.text,
            parse_mode: "MarkdownV2",
            disable_web_page_preview: !message.link_preview,
        };

        let label = format!("sendMessage to {chat_id}");
        let (attempts, result) = with_retry(&self.retry, &label, || self.send_once(&body)).await;

        match result {
            Ok(()) => {
                log::debug!("Message delivered to {} (attempt {})", chat_id, attempts);
                true
            }
            Err(error) => {
                log::warn!(
                    "Giving up on message to {} after {} attempt(s): {}",
                    chat_id,
                    attempts,
                    error
                );
                false
            }
        }
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}
