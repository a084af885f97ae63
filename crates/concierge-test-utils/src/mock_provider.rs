// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock text generation provider for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with a scripted FIFO queue of
//! replies, an always-fail mode, and an optional artificial delay.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use concierge_core::ConciergeError;
use concierge_core::traits::adapter::PluginAdapter;
use concierge_core::traits::provider::ProviderAdapter;
use concierge_core::types::{ProviderRequest, ProviderResponse};

/// One scripted provider outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Succeed with this text.
    Text(String),
    /// Fail with a provider error carrying this message.
    Error(String),
}

/// A mock provider that returns pre-configured replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned.
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
    always_fail: bool,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new mock provider with an empty queue.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            always_fail: false,
            delay: None,
        }
    }

    /// Create a mock provider pre-loaded with successful replies.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let replies = responses
            .into_iter()
            .map(|s| MockReply::Text(s.into()))
            .collect();
        Self {
            replies: Arc::new(Mutex::new(replies)),
            ..Self::new()
        }
    }

    /// A provider whose every call fails.
    pub fn failing() -> Self {
        Self {
            always_fail: true,
            ..Self::new()
        }
    }

    /// Sleeps for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful reply.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.replies
            .lock()
            .await
            .push_back(MockReply::Text(text.into()));
    }

    /// Queue a failure.
    pub async fn add_error(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .await
            .push_back(MockReply::Error(message.into()));
    }

    /// Every request received so far, in call order.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of calls received so far.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    async fn next_reply(&self) -> MockReply {
        if self.always_fail {
            return MockReply::Error("mock provider failure".to_string());
        }
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::Text("mock response".to_string()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    async fn shutdown(&self) -> Result<(), ConciergeError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ConciergeError> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| "mock-model".to_string());
        self.requests.lock().await.push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_reply().await {
            MockReply::Text(content) => Ok(ProviderResponse { content, model }),
            MockReply::Error(message) => Err(ConciergeError::provider(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        let text = provider.generate("hi").await.unwrap();
        assert_eq!(text, "mock response");
    }

    #[tokio::test]
    async fn queued_replies_returned_in_order() {
        let provider = MockProvider::with_responses(["first", "second"]);
        provider.add_error("boom").await;

        assert_eq!(provider.generate("a").await.unwrap(), "first");
        assert_eq!(provider.generate("b").await.unwrap(), "second");
        assert!(provider.generate("c").await.is_err());
        assert_eq!(provider.generate("d").await.unwrap(), "mock response");
    }

    #[tokio::test]
    async fn failing_provider_always_errors() {
        let provider = MockProvider::failing();
        provider.add_response("ignored").await;
        assert!(matches!(
            provider.generate("x").await,
            Err(ConciergeError::Provider { .. })
        ));
        assert!(provider.generate("y").await.is_err());
    }

    #[tokio::test]
    async fn requests_are_recorded() {
        let provider = MockProvider::new();
        provider
            .complete(ProviderRequest::prompt("hello").with_temperature(0.0))
            .await
            .unwrap();

        let requests = provider.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "hello");
        assert_eq!(requests[0].temperature, Some(0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn delay_is_applied() {
        let provider = MockProvider::with_responses(["slow"]).with_delay(Duration::from_secs(5));
        let started = tokio::time::Instant::now();
        assert_eq!(provider.generate("x").await.unwrap(), "slow");
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
