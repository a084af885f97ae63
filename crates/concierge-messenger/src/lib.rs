// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facebook Messenger channel adapter for the Concierge chat relay.
//!
//! [`MessengerWebhook`] answers the subscription handshake and turns signed
//! deliveries into [`InboundMessage`]s. [`MessengerChannel`] sends replies
//! through the Graph API Send API.

pub mod signature;
pub mod webhook;

use std::time::Duration;

use async_trait::async_trait;
use concierge_config::model::MessengerConfig;
use concierge_core::traits::adapter::PluginAdapter;
use concierge_core::traits::channel::ChannelAdapter;
use concierge_core::types::{
    InboundMessage, MessageId, OutboundMessage, Platform, ReplyTarget,
};
use concierge_core::ConciergeError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use webhook::{Subscription, SubscriptionQuery};

/// Webhook-side state for one page.
#[derive(Clone)]
pub struct MessengerWebhook {
    verify_token: String,
    app_secret: Option<String>,
}

impl MessengerWebhook {
    /// `app_secret` of `None` accepts unsigned deliveries.
    pub fn new(verify_token: impl Into<String>, app_secret: Option<String>) -> Self {
        Self {
            verify_token: verify_token.into(),
            app_secret,
        }
    }

    /// Builds the webhook from config, or `None` when the page is not configured.
    pub fn from_config(config: &MessengerConfig) -> Option<Self> {
        let verify_token = config.verify_token.clone()?;
        Some(Self::new(verify_token, config.app_secret.clone()))
    }

    pub fn verify_subscription(&self, query: &SubscriptionQuery) -> Subscription {
        webhook::check_subscription(query, &self.verify_token)
    }

    /// Verifies the signature when an app secret is configured, then parses.
    pub fn handle(
        &self,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<Vec<InboundMessage>, ConciergeError> {
        if let Some(secret) = &self.app_secret {
            signature::verify(secret, body, signature)?;
        }
        webhook::parse_events(body)
    }
}

impl std::fmt::Debug for MessengerWebhook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessengerWebhook")
            .field("verify_token", &"[redacted]")
            .field("app_secret", &self.app_secret.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    recipient: Recipient<'a>,
    message: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct Recipient<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    message_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorResponse {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
    #[serde(default)]
    code: Option<i64>,
}

/// Send API transport implementing [`ChannelAdapter`].
pub struct MessengerChannel {
    client: reqwest::Client,
    page_access_token: String,
    send_url: String,
}

impl MessengerChannel {
    pub fn new(config: &MessengerConfig) -> Result<Self, ConciergeError> {
        let page_access_token = config
            .page_access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ConciergeError::Config(
                    "Messenger page access token not found. Set messenger.page_access_token or FB_PAGE_ACCESS_TOKEN.".into(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ConciergeError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let send_url = format!(
            "{}/{}/me/messages",
            config.api_base_url.trim_end_matches('/'),
            config.graph_api_version
        );
        info!(send_url, "Messenger channel initialized");

        Ok(Self {
            client,
            page_access_token,
            send_url,
        })
    }
}

#[async_trait]
impl PluginAdapter for MessengerChannel {
    fn name(&self) -> &str {
        "messenger"
    }

    async fn shutdown(&self) -> Result<(), ConciergeError> {
        debug!("Messenger channel shutting down");
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MessengerChannel {
    fn platform(&self) -> Platform {
        Platform::Messenger
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ConciergeError> {
        let ReplyTarget::User(recipient) = &msg.target else {
            return Err(ConciergeError::channel(
                "Messenger replies are addressed by sender id, not reply token",
            ));
        };

        let body = SendRequest {
            recipient: Recipient { id: recipient },
            message: TextBody { text: &msg.text },
        };

        let response = self
            .client
            .post(&self.send_url)
            .query(&[("access_token", self.page_access_token.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // The URL carries the page token.
                let e = e.without_url();
                ConciergeError::Channel {
                    message: format!("Messenger request failed: {e}"),
                    source: Some(Box::new(e)),
                }
            })?;

        let status = response.status();
        debug!(status = %status, "Send API response received");
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let message = match serde_json::from_str::<GraphErrorResponse>(&text) {
                Ok(GraphErrorResponse { error }) => match error.code {
                    Some(code) => {
                        format!("Send API error ({status}, code {code}): {}", error.message)
                    }
                    None => format!("Send API error ({status}): {}", error.message),
                },
                Err(_) => format!("Send API returned {status}: {text}"),
            };
            warn!(%status, "Messenger send failed");
            return Err(ConciergeError::channel(message));
        }

        let message_id = serde_json::from_str::<SendResponse>(&text)
            .ok()
            .and_then(|r| r.message_id)
            .unwrap_or_else(|| recipient.clone());
        Ok(MessageId(message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> MessengerConfig {
        MessengerConfig {
            page_access_token: Some("page-token".into()),
            verify_token: Some("verify".into()),
            app_secret: None,
            graph_api_version: "v18.0".into(),
            api_base_url: base_url.to_string(),
        }
    }

    fn outbound(target: ReplyTarget) -> OutboundMessage {
        OutboundMessage {
            platform: Platform::Messenger,
            target,
            text: "Parking is free for guests.".into(),
        }
    }

    #[test]
    fn missing_page_token_is_config_error() {
        let result = MessengerChannel::new(&MessengerConfig::default());
        assert!(matches!(result, Err(ConciergeError::Config(_))));
    }

    #[test]
    fn from_config_requires_verify_token() {
        assert!(MessengerWebhook::from_config(&MessengerConfig::default()).is_none());
        assert!(MessengerWebhook::from_config(&config("http://x")).is_some());
    }

    #[test]
    fn unsigned_delivery_accepted_without_app_secret() {
        let hook = MessengerWebhook::new("verify", None);
        let body = br#"{"object":"page","entry":[]}"#;
        assert!(hook.handle(None, body).unwrap().is_empty());
    }

    #[test]
    fn signature_enforced_with_app_secret() {
        let hook = MessengerWebhook::new("verify", Some("app-secret".into()));
        let body = br#"{"object":"page","entry":[]}"#;
        assert!(matches!(
            hook.handle(None, body),
            Err(ConciergeError::Signature { .. })
        ));
        let header = signature::sign("app-secret", body);
        assert!(hook.handle(Some(&header), body).is_ok());
    }

    #[test]
    fn debug_redacts_tokens() {
        let hook = MessengerWebhook::new("verify-me", Some("app-secret".into()));
        let debug = format!("{hook:?}");
        assert!(!debug.contains("verify-me"));
        assert!(!debug.contains("app-secret"));
    }

    #[tokio::test]
    async fn send_posts_to_send_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v18.0/me/messages"))
            .and(query_param("access_token", "page-token"))
            .and(body_json(serde_json::json!({
                "recipient": {"id": "PSID1"},
                "message": {"text": "Parking is free for guests."}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "recipient_id": "PSID1",
                "message_id": "m_out_1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let channel = MessengerChannel::new(&config(&server.uri())).unwrap();
        let id = channel
            .send(outbound(ReplyTarget::User("PSID1".into())))
            .await
            .unwrap();
        assert_eq!(id, MessageId("m_out_1".into()));
    }

    #[tokio::test]
    async fn reply_token_target_is_rejected() {
        let channel = MessengerChannel::new(&config("http://127.0.0.1:9")).unwrap();
        let err = channel
            .send(outbound(ReplyTarget::ReplyToken("t".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, ConciergeError::Channel { .. }));
    }

    #[tokio::test]
    async fn graph_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "Invalid OAuth access token.", "type": "OAuthException", "code": 190}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let channel = MessengerChannel::new(&config(&server.uri())).unwrap();
        let err = channel
            .send(outbound(ReplyTarget::User("PSID1".into())))
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("code 190"), "got: {text}");
        assert!(!text.contains("page-token"), "token leaked: {text}");
    }
}
