// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply orchestration.
//!
//! [`FaqResponder`] classifies, hands off long conversations, and otherwise
//! answers from the catalog: classify > handoff check > lookup > rewrite.
//! The rewrite runs under `faq.response_timeout_secs` and keeps the canned
//! text when it overruns.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use concierge_config::model::FaqConfig;
use concierge_core::{
    Classification, ConciergeError, ProviderAdapter, QueryType, ResponseCategory,
};
use tracing::{info, warn};

use crate::catalog::ResponseCatalog;
use crate::classifier::Classifier;
use crate::personality::Rewriter;
use crate::phrases;

/// A reply and how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub category: ResponseCategory,
}

impl Reply {
    pub fn new(text: impl Into<String>, category: ResponseCategory) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }
}

/// Turns a message into a reply. Implementations never fail.
#[async_trait]
pub trait Responder: Send + Sync {
    /// `message_count` is the number of replies already sent to the sender.
    async fn respond(&self, text: &str, message_count: usize) -> Reply;
}

/// Classify, answer from the catalog, rewrite, and hand off after a cutoff.
pub struct FaqResponder {
    classifier: Classifier,
    rewriter: Rewriter,
    catalog: Arc<ResponseCatalog>,
    handoff_after: usize,
}

impl FaqResponder {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        catalog: Arc<ResponseCatalog>,
        config: &FaqConfig,
    ) -> Self {
        Self {
            classifier: Classifier::new(provider.clone()),
            rewriter: Rewriter::new(
                provider,
                config.personality,
                Duration::from_secs(config.response_timeout_secs),
            ),
            catalog,
            handoff_after: config.handoff_after,
        }
    }

    /// Override the rewrite deadline.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.rewriter = self.rewriter.with_deadline(timeout);
        self
    }

    /// Produce the reply for `text` given the sender's prior reply count.
    pub async fn generate_response(&self, text: &str, message_count: usize) -> Reply {
        let classification = self.classifier.classify(text).await.into_inner();
        let language = classification.language;

        if message_count >= self.handoff_after {
            info!(%language, message_count, "handing conversation off to staff");
            return Reply::new(phrases::handoff(language), ResponseCategory::Handoff);
        }

        match self.answer(&classification).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(%language, error = %e, "answering failed, sending apology");
                Reply::new(phrases::apology(language), ResponseCategory::Error)
            }
        }
    }

    /// Lookup plus rewrite. The rewrite runs on its own task so a panicking
    /// provider surfaces here as an error instead of losing the reply.
    async fn answer(&self, classification: &Classification) -> Result<Reply, ConciergeError> {
        let base = self
            .catalog
            .lookup(classification.query_type, classification.language)
            .to_string();
        let rewriter = self.rewriter.clone();
        let language = classification.language;
        let text = tokio::spawn(async move { rewriter.rewrite(&base, language).await })
            .await
            .map_err(|e| ConciergeError::Internal(format!("rewrite task failed: {e}")))?
            .into_inner();

        let category = if classification.query_type == QueryType::Other {
            ResponseCategory::Other
        } else {
            ResponseCategory::Faq
        };
        Ok(Reply::new(text, category))
    }
}

#[async_trait]
impl Responder for FaqResponder {
    async fn respond(&self, text: &str, message_count: usize) -> Reply {
        self.generate_response(text, message_count).await
    }
}
