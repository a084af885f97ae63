// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LINE webhook payload parsing.
//!
//! Only `message` events carrying a text message from an identifiable user
//! become [`InboundMessage`]s. Follows, stickers, postbacks and the rest are
//! acknowledged and dropped.

use concierge_core::{ConciergeError, InboundMessage, Platform};
use serde::Deserialize;
use tracing::debug;

/// Top-level webhook body.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// One webhook event. Fields not used here are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub message: Option<EventMessage>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub webhook_event_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl Event {
    fn into_inbound(self) -> Option<InboundMessage> {
        if self.event_type != "message" {
            return None;
        }
        let message = self.message?;
        if message.message_type != "text" {
            return None;
        }
        let text = message.text?;
        let sender_id = self.source?.user_id?;

        Some(InboundMessage {
            id: self
                .webhook_event_id
                .or(message.id)
                .unwrap_or_default(),
            sender_id,
            text,
            platform: Platform::Line,
            reply_token: self.reply_token,
            received_at: rfc3339_from_millis(self.timestamp),
        })
    }
}

fn rfc3339_from_millis(millis: Option<i64>) -> String {
    millis
        .and_then(chrono::DateTime::from_timestamp_millis)
        .unwrap_or_else(chrono::Utc::now)
        .to_rfc3339()
}

/// Extracts text messages from a raw webhook body.
pub fn parse_events(body: &[u8]) -> Result<Vec<InboundMessage>, ConciergeError> {
    let payload: WebhookPayload =
        serde_json::from_slice(body).map_err(|e| ConciergeError::Channel {
            message: format!("malformed LINE webhook body: {e}"),
            source: Some(Box::new(e)),
        })?;

    let total = payload.events.len();
    let messages: Vec<_> = payload
        .events
        .into_iter()
        .filter_map(Event::into_inbound)
        .collect();
    debug!(total, text_messages = messages.len(), "parsed LINE webhook");
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "destination": "Ubot",
        "events": [
            {
                "type": "message",
                "mode": "active",
                "timestamp": 1700000000000,
                "webhookEventId": "01HEVENT",
                "replyToken": "reply-1",
                "source": {"type": "user", "userId": "U123"},
                "message": {"type": "text", "id": "468789577898262530", "text": "What time do you open?"}
            },
            {
                "type": "message",
                "replyToken": "reply-2",
                "source": {"type": "user", "userId": "U123"},
                "message": {"type": "sticker", "id": "2", "packageId": "1", "stickerId": "1"}
            },
            {
                "type": "follow",
                "replyToken": "reply-3",
                "source": {"type": "user", "userId": "U456"}
            }
        ]
    }"#;

    #[test]
    fn only_text_messages_are_kept() {
        let messages = parse_events(BODY.as_bytes()).unwrap();
        assert_eq!(messages.len(), 1);
        let msg = &messages[0];
        assert_eq!(msg.id, "01HEVENT");
        assert_eq!(msg.sender_id, "U123");
        assert_eq!(msg.text, "What time do you open?");
        assert_eq!(msg.platform, Platform::Line);
        assert_eq!(msg.reply_token.as_deref(), Some("reply-1"));
        assert!(msg.received_at.starts_with("2023-11-14T22:13:20"));
    }

    #[test]
    fn empty_events_verification_ping() {
        let messages = parse_events(br#"{"destination": "Ubot", "events": []}"#).unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn message_without_user_id_is_dropped() {
        let body = br#"{"events": [{"type": "message", "replyToken": "r",
            "source": {"type": "group", "groupId": "G1"},
            "message": {"type": "text", "id": "1", "text": "hi"}}]}"#;
        assert!(parse_events(body).unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_channel_error() {
        assert!(matches!(
            parse_events(b"not json"),
            Err(ConciergeError::Channel { .. })
        ));
    }
}
