// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LINE Messaging API channel adapter for the Concierge chat relay.
//!
//! Inbound events arrive at the webhook gateway, which uses [`LineWebhook`]
//! to verify and parse them. Replies go out through [`LineChannel`], using
//! the reply API when a reply token is available and the push API otherwise.

pub mod signature;
pub mod webhook;

use std::time::Duration;

use async_trait::async_trait;
use concierge_config::model::LineConfig;
use concierge_core::traits::adapter::PluginAdapter;
use concierge_core::traits::channel::ChannelAdapter;
use concierge_core::types::{
    InboundMessage, MessageId, OutboundMessage, Platform, ReplyTarget,
};
use concierge_core::ConciergeError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Verifies and parses webhook deliveries for one channel.
#[derive(Clone)]
pub struct LineWebhook {
    channel_secret: String,
}

impl LineWebhook {
    pub fn new(channel_secret: impl Into<String>) -> Self {
        Self {
            channel_secret: channel_secret.into(),
        }
    }

    /// Verifies `signature` over `body`, then extracts text messages.
    pub fn handle(
        &self,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<Vec<InboundMessage>, ConciergeError> {
        signature::verify(&self.channel_secret, body, signature)?;
        webhook::parse_events(body)
    }
}

impl std::fmt::Debug for LineWebhook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineWebhook")
            .field("channel_secret", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [TextMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: [TextMessage<'a>; 1],
}

/// Error body returned by the Messaging API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    message: String,
}

/// LINE reply transport implementing [`ChannelAdapter`].
pub struct LineChannel {
    client: reqwest::Client,
    access_token: String,
    api_base_url: String,
}

impl LineChannel {
    /// Creates a new LINE channel from the given configuration.
    pub fn new(config: &LineConfig) -> Result<Self, ConciergeError> {
        let access_token = config
            .channel_access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ConciergeError::Config(
                    "LINE channel access token not found. Set line.channel_access_token or LINE_CHANNEL_ACCESS_TOKEN.".into(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ConciergeError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(api_base_url = config.api_base_url, "LINE channel initialized");

        Ok(Self {
            client,
            access_token,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<(), ConciergeError> {
        let url = format!("{}{path}", self.api_base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| ConciergeError::Channel {
                message: format!("LINE request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, path, "LINE API response received");
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => format!("LINE API error ({status}): {}", api_err.message),
            Err(_) => format!("LINE API returned {status}: {body}"),
        };
        warn!(%status, path, "LINE API call failed");
        Err(ConciergeError::channel(message))
    }
}

#[async_trait]
impl PluginAdapter for LineChannel {
    fn name(&self) -> &str {
        "line"
    }

    async fn shutdown(&self) -> Result<(), ConciergeError> {
        debug!("LINE channel shutting down");
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for LineChannel {
    fn platform(&self) -> Platform {
        Platform::Line
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ConciergeError> {
        let messages = [TextMessage {
            kind: "text",
            text: &msg.text,
        }];
        match &msg.target {
            ReplyTarget::ReplyToken(token) => {
                let body = ReplyRequest {
                    reply_token: token,
                    messages,
                };
                self.post("/v2/bot/message/reply", &body).await?;
                Ok(MessageId(token.clone()))
            }
            ReplyTarget::User(user_id) => {
                let body = PushRequest {
                    to: user_id,
                    messages,
                };
                self.post("/v2/bot/message/push", &body).await?;
                Ok(MessageId(user_id.clone()))
            }
        }
    }
}
