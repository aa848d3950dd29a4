//! Telegram Bot API client (`sendMessage` only).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use omnilink_common::types::Destination;

use crate::{MessageSender, NotifyError};

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Reqwest-backed Telegram client shared by every request handler.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
}

impl TelegramClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_base)
    }

    pub fn with_client(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, token)
    }
}

#[async_trait]
impl MessageSender for TelegramClient {
    async fn send(&self, destination: &Destination, text: &str) -> Result<(), NotifyError> {
        let body = SendMessageRequest {
            chat_id: &destination.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        // `without_url` keeps the bot token out of error strings and logs.
        let response = self
            .http
            .post(self.endpoint(&destination.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url().to_string()))?;

        match serde_json::from_str::<BotApiResponse>(&raw) {
            Ok(parsed) if status.is_success() && parsed.ok => {}
            Ok(parsed) => {
                return Err(NotifyError::Rejected {
                    status: status.as_u16(),
                    description: parsed
                        .description
                        .unwrap_or_else(|| "no description".to_string()),
                });
            }
            // Proxies and gateways answer failures with HTML or plain text.
            Err(_) if !status.is_success() => {
                return Err(NotifyError::Rejected {
                    status: status.as_u16(),
                    description: body_excerpt(&raw),
                });
            }
            Err(e) => return Err(NotifyError::Decode(e.to_string())),
        }

        tracing::debug!(chat_id = %destination.chat_id, "Telegram message delivered");
        Ok(())
    }
}

const MAX_EXCERPT_CHARS: usize = 200;

fn body_excerpt(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_EXCERPT_CHARS).collect()
}
