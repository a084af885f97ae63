// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Direct relay: the model's answer to the raw message is the reply.

use std::sync::Arc;

use async_trait::async_trait;
use concierge_core::{ProviderAdapter, ResponseCategory};
use tracing::warn;

use crate::phrases;
use crate::responder::{Reply, Responder};

/// Forwards each message to the generator unmodified.
pub struct RelayResponder {
    provider: Arc<dyn ProviderAdapter>,
}

impl RelayResponder {
    pub fn new(provider: Arc<dyn ProviderAdapter>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Responder for RelayResponder {
    async fn respond(&self, text: &str, _message_count: usize) -> Reply {
        match self.provider.generate(text).await {
            Ok(generated) if !generated.trim().is_empty() => {
                Reply::new(generated.trim(), ResponseCategory::Other)
            }
            Ok(_) => {
                warn!("relay generation was empty");
                Reply::new(phrases::RELAY_ERROR, ResponseCategory::Error)
            }
            Err(e) => {
                warn!(error = %e, "relay generation failed");
                Reply::new(phrases::RELAY_ERROR, ResponseCategory::Error)
            }
        }
    }
}
