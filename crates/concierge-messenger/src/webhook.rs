// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messenger webhook handling: the subscription handshake and event parsing.

use concierge_core::{ConciergeError, InboundMessage, Platform};
use serde::Deserialize;
use tracing::debug;

/// Query parameters of the `GET` subscription handshake.
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Result of checking a subscription handshake.
#[derive(Debug, PartialEq, Eq)]
pub enum Subscription {
    /// Echo the challenge back.
    Confirmed(String),
    /// A handshake with the wrong token.
    TokenMismatch,
    /// Not a handshake at all.
    NotRequested,
}

/// Checks a handshake against the expected verify token.
pub fn check_subscription(query: &SubscriptionQuery, expected_token: &str) -> Subscription {
    let (Some("subscribe"), Some(challenge)) = (query.mode.as_deref(), query.challenge.as_ref())
    else {
        return Subscription::NotRequested;
    };

    if query.verify_token.as_deref() == Some(expected_token) {
        Subscription::Confirmed(challenge.clone())
    } else {
        Subscription::TokenMismatch
    }
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Deserialize)]
pub struct MessagingEvent {
    pub sender: Participant,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Participant {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Set on messages the page itself sent.
    #[serde(default)]
    pub is_echo: bool,
}

impl MessagingEvent {
    fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message?;
        if message.is_echo {
            return None;
        }
        let text = message.text?;

        Some(InboundMessage {
            id: message.mid.unwrap_or_default(),
            sender_id: self.sender.id,
            text,
            platform: Platform::Messenger,
            reply_token: None,
            received_at: self
                .timestamp
                .and_then(chrono::DateTime::from_timestamp_millis)
                .unwrap_or_else(chrono::Utc::now)
                .to_rfc3339(),
        })
    }
}

/// Extracts text messages from a raw webhook body.
///
/// Payloads whose `object` is not `page` yield nothing.
pub fn parse_events(body: &[u8]) -> Result<Vec<InboundMessage>, ConciergeError> {
    let payload: WebhookPayload =
        serde_json::from_slice(body).map_err(|e| ConciergeError::Channel {
            message: format!("malformed Messenger webhook body: {e}"),
            source: Some(Box::new(e)),
        })?;

    if payload.object != "page" {
        debug!(object = payload.object, "ignoring non-page webhook");
        return Ok(Vec::new());
    }

    let messages: Vec<_> = payload
        .entry
        .into_iter()
        .flat_map(|entry| entry.messaging)
        .filter_map(MessagingEvent::into_inbound)
        .collect();
    debug!(text_messages = messages.len(), "parsed Messenger webhook");
    Ok(messages)
}
