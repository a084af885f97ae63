// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for text generation backends (Gemini, etc.).

use async_trait::async_trait;

use crate::error::ConciergeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for a text generation backend.
///
/// Callers get no retry contract: a failed request is reported once and the
/// caller decides how to degrade.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a prompt and returns the full generation.
    async fn complete(&self, request: ProviderRequest)
    -> Result<ProviderResponse, ConciergeError>;

    /// Convenience wrapper returning only the generated text.
    async fn generate(&self, prompt: &str) -> Result<String, ConciergeError> {
        self.complete(ProviderRequest::prompt(prompt))
            .await
            .map(|r| r.content)
    }
}
