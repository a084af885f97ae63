// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock reply transport for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` and captures every outbound
//! message for assertion in tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use concierge_core::ConciergeError;
use concierge_core::traits::adapter::PluginAdapter;
use concierge_core::traits::channel::ChannelAdapter;
use concierge_core::types::{MessageId, OutboundMessage, Platform};

/// A mock channel that records what it was asked to send.
pub struct MockChannel {
    platform: Platform,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    notify: Arc<Notify>,
    fail_sends: bool,
}

impl MockChannel {
    /// Create a new mock channel for `platform`.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            sent: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            fail_sends: false,
        }
    }

    /// A channel whose sends always fail. Attempts are still recorded.
    pub fn failing(platform: Platform) -> Self {
        Self {
            fail_sends: true,
            ..Self::new(platform)
        }
    }

    /// Get all messages that were passed to `send()`.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Get the count of sent messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Wait until at least `count` messages have been sent.
    pub async fn wait_for_sent(&self, count: usize) {
        loop {
            let notified = self.notify.notified();
            if self.sent_count().await >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    async fn shutdown(&self) -> Result<(), ConciergeError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ConciergeError> {
        self.sent.lock().await.push(msg);
        self.notify.notify_waiters();
        if self.fail_sends {
            return Err(ConciergeError::channel("mock send failure"));
        }
        Ok(MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::types::ReplyTarget;

    fn outbound(text: &str) -> OutboundMessage {
        OutboundMessage {
            platform: Platform::Line,
            target: ReplyTarget::ReplyToken("token".to_string()),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn send_captures_message() {
        let channel = MockChannel::new(Platform::Line);
        channel.send(outbound("hello")).await.unwrap();

        let sent = channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, "hello");
        assert_eq!(channel.platform(), Platform::Line);
    }

    #[tokio::test]
    async fn failing_channel_records_then_errors() {
        let channel = MockChannel::failing(Platform::Messenger);
        assert!(channel.send(outbound("x")).await.is_err());
        assert_eq!(channel.sent_count().await, 1);
    }

    #[tokio::test]
    async fn wait_for_sent_returns_once_reached() {
        let channel = Arc::new(MockChannel::new(Platform::Line));
        let sender = Arc::clone(&channel);
        let handle = tokio::spawn(async move {
            sender.send(outbound("a")).await.unwrap();
        });
        channel.wait_for_sent(1).await;
        handle.await.unwrap();
        assert_eq!(channel.sent_count().await, 1);
    }
}
